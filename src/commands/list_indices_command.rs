use crate::batch::errors::BatchResult;
use crate::commands::command_traits::Command;
use crate::indices::INDEX_TABLE;

/// Prints the supported indices and the bands each one needs
pub struct ListIndicesCommand;

impl ListIndicesCommand {
    pub fn render() -> String {
        let mut out = format!("{:<6} {:<12} {}\n", "Index", "Bands", "Description");
        for spec in INDEX_TABLE.iter() {
            out.push_str(&format!("{:<6} {:<12} {}\n", spec.name, spec.bands.join(","), spec.description));
        }
        out
    }
}

impl Command for ListIndicesCommand {
    fn execute(&self) -> BatchResult<()> {
        print!("{}", Self::render());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_index() {
        let text = ListIndicesCommand::render();
        assert_eq!(text.lines().count(), 9);
        assert!(text.lines().any(|l| l.starts_with("EVI") && l.contains("B5,B4,B2")));
    }
}
