use anyhow::Error as Anyhow;
use clap::Subcommand;
use derive_more::From;

mod preview;
mod serve;

#[derive(From, Subcommand)]
pub enum Applet {
    Serve(serve::Serve),
    Preview(preview::Preview),
}

impl Default for Applet {
    fn default() -> Self {
        serve::Serve::default().into()
    }
}

impl Applet {
    pub async fn execute(self) -> Result<(), Anyhow> {
        match self {
            Applet::Serve(a) => Ok(a.execute().await?),
            Applet::Preview(a) => Ok(a.execute().await?),
        }
    }
}
