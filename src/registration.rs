/// How a hosting framework discovers an environment and bounds its episodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvSpec {
    pub id: &'static str,
    pub max_episode_steps: usize,
}

/// The warehouse environment as registered with the gym
pub const WAREHOUSE_V0: EnvSpec = EnvSpec {
    id: "warehouse/Warehouse-v0",
    max_episode_steps: 300,
};
