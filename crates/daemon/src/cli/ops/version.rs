use std::convert::Infallible;

use clap::Args;

use common::build_info;

#[derive(Args, Debug, Clone)]
pub struct Version {
    /// Print build details as JSON
    #[arg(long)]
    pub json: bool,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Version {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let info = build_info!();
        if self.json {
            if let Ok(rendered) = serde_json::to_string_pretty(&info) {
                return Ok(rendered);
            }
        }
        Ok(info.to_string())
    }
}
