use std::path::PathBuf;

use clap::Args;
use tokio::io::AsyncWriteExt;

use pasted_daemon::http_server::client::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Key returned when the paste was stored
    pub key: String,

    /// Write the paste to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Get {
    type Error = GetError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let body = ctx.client.fetch_paste(&self.key).await?;

        // pastes may be binary, so they bypass the Display output path
        match &self.output {
            Some(path) => {
                tokio::fs::write(path, &body).await?;
                Ok(format!("wrote {} bytes to {}", body.len(), path.display()))
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&body).await?;
                stdout.flush().await?;
                Ok(String::new())
            }
        }
    }
}
