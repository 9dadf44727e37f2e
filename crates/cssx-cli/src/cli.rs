use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cssx")]
#[command(version, about = "CSSX page compiler")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Parser, Debug)]
pub enum Commands {
    /// Compile every page in PAGES into OUTPUT.
    Build {
        /// Directory holding the `.cssx` pages; also the root for `--import`.
        #[arg(default_value = "src/pages")]
        pages: PathBuf,

        #[arg(short, long, default_value = "dist")]
        output: PathBuf,

        /// Files copied unchanged into the output directory.
        #[arg(long, default_value = "public")]
        public: PathBuf,

        /// JSON file with site-wide page defaults.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_defaults() {
        let cli = Cli::try_parse_from(["cssx", "build"]).expect("parse args");
        let Commands::Build {
            pages,
            output,
            public,
            config,
        } = cli.command;
        assert_eq!(pages, PathBuf::from("src/pages"));
        assert_eq!(output, PathBuf::from("dist"));
        assert_eq!(public, PathBuf::from("public"));
        assert!(config.is_none());
    }

    #[test]
    fn build_overrides() {
        let cli = Cli::try_parse_from([
            "cssx", "build", "site", "-o", "out", "--public", "static", "--config", "cssx.json",
        ])
        .expect("parse args");
        let Commands::Build {
            pages,
            output,
            public,
            config,
        } = cli.command;
        assert_eq!(pages, PathBuf::from("site"));
        assert_eq!(output, PathBuf::from("out"));
        assert_eq!(public, PathBuf::from("static"));
        assert_eq!(config, Some(PathBuf::from("cssx.json")));
    }
}
