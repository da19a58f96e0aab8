//! Processing code commands.
//!
//! `codes list` prints the registries a code can reference; `codes decode`
//! explains one or more codes.

use clap::{Subcommand, ValueEnum};
use geedar::code::{decode, parse_codes, ProcessingPlan};
use geedar::registry;

use crate::error::CliError;

/// Registry selection for `codes list`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Catalog {
    Products,
    Pixel,
    Estimation,
    Reducers,
    All,
}

/// Codes subcommands.
#[derive(Debug, Subcommand)]
pub enum CodesCommands {
    /// List products, algorithms and reducers
    List {
        /// Which registry to print
        #[arg(value_enum, default_value = "all")]
        catalog: Catalog,
    },

    /// Explain processing codes
    Decode {
        /// One code or a list such as "20109021,30109001"
        codes: String,
    },
}

/// Run a codes subcommand.
pub fn run(command: CodesCommands) -> Result<(), CliError> {
    match command {
        CodesCommands::List { catalog } => {
            print!("{}", render_catalog(catalog));
            Ok(())
        }
        CodesCommands::Decode { codes } => {
            for code in parse_codes(&codes)? {
                let plan = decode(code)?;
                println!("{}", describe(&plan));
            }
            Ok(())
        }
    }
}

fn render_catalog(catalog: Catalog) -> String {
    let wants = |c: Catalog| catalog == Catalog::All || catalog == c;
    let mut out = String::new();

    if wants(Catalog::Products) {
        out.push_str("Products\n========\n");
        for p in registry::products() {
            out.push_str(&format!(
                "  {:>3}  {:<20} {:<36} since {}\n",
                p.id,
                p.sensor,
                p.collection,
                p.start_date()
            ));
        }
        out.push('\n');
    }
    if wants(Catalog::Pixel) {
        out.push_str("Pixel-selection algorithms\n==========================\n");
        for a in registry::pixel_algorithms() {
            out.push_str(&format!(
                "  {:>2}  {} (max {} images per request)\n",
                a.id, a.name, a.max_simultaneous_images
            ));
        }
        out.push('\n');
    }
    if wants(Catalog::Estimation) {
        out.push_str("Estimation algorithms\n=====================\n");
        for a in registry::estimation_algorithms() {
            out.push_str(&format!("  {:>2}  {}\n", a.id, a.name));
        }
        out.push('\n');
    }
    if wants(Catalog::Reducers) {
        out.push_str("Reducers\n========\n");
        for r in registry::reducers() {
            out.push_str(&format!("  {:>2}  {}\n", r.id, r.name));
        }
        out.push('\n');
    }
    out
}

fn describe(plan: &ProcessingPlan) -> String {
    let product = plan.product();
    format!(
        "{}\n  product:    {} ({}, {})\n  pixels:     {} {}\n  estimation: {} {}\n  reducer:    {} {}",
        plan.code(),
        product.id,
        product.sensor,
        product.collection,
        plan.pixel_algo_id(),
        plan.pixel_algo().name,
        plan.estimation_algo_id(),
        plan.estimation_algo().name,
        plan.reducer_id(),
        plan.reducer().name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_precipitation_code() {
        let text = describe(&decode(90114001).unwrap());
        assert!(text.starts_with("90114001"));
        assert!(text.contains("GPM/IMERG"));
        assert!(text.contains("reducer:    1 median"));
    }

    #[test]
    fn test_render_single_catalog() {
        let text = render_catalog(Catalog::Reducers);
        assert!(text.starts_with("Reducers"));
        assert!(!text.contains("Products"));
        assert!(render_catalog(Catalog::All).contains("Estimation algorithms"));
    }
}
