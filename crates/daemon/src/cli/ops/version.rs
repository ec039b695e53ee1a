use std::convert::Infallible;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Version;

#[async_trait::async_trait]
impl crate::cli::op::Op for Version {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        Ok(minibin_daemon::build_info().to_string())
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::cli::op::{Op, OpContext};

    #[tokio::test]
    async fn test_version_reports_daemon_package() {
        let ctx = OpContext::new(&Url::parse("http://127.0.0.1:1").unwrap(), None).unwrap();
        let output = Version.execute(&ctx).await.unwrap();
        assert!(output.starts_with("minibin-daemon "));
    }
}
