use anyhow::Error as Anyhow;
use clap::Parser;
use lib::rules::{PieceRule, Preview as Grid};
use tracing::instrument;

/// Draw the cells a piece type reaches from the centre of an empty grid.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Preview {
    /// How many cells to draw around the piece.
    #[clap(short, long, default_value_t = 3)]
    radius: u8,

    /// Preview from the perspective of the second player.
    #[clap(short, long)]
    backward: bool,

    /// The piece type in JSON, e.g. `{"name":"Archer","symbol":"a","capabilities":[{"type":"leap","offsets":[[0,3]]}]}`.
    rule: PieceRule,
}

impl Preview {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        self.rule.validate()?;

        let forward = if self.backward { -1 } else { 1 };
        let grid = Grid::new(&self.rule.capabilities, self.radius, forward);

        println!("{} {}", self.rule.symbol, self.rule.name);
        for c in &self.rule.capabilities {
            println!("  {c}");
        }

        println!("\n{grid}");
        Ok(())
    }
}
