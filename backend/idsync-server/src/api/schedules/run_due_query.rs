use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct RunDueQuery {
    /// Run every active schedule, due or not
    #[serde(default)]
    pub force_run_all: bool,
}
