use clap::Parser;
use std::path::PathBuf;
use uclone_core::{CloneOptions, CloneRequest, Whitelists};

#[derive(Parser, Debug)]
#[command(name = "uclone")]
#[command(version)]
#[command(about = "Clone a game project into a new directory under a new name")]
#[command(long_about = "Copies the whitelisted parts of a game project into a new directory, renaming the \
    project in directory names, file names and the contents of text files. Binary assets are copied \
    untouched, and DefaultEngine.ini gains redirects so existing assets still resolve their classes.")]
pub struct Cli {
    #[arg(long, env = "UCLONE_SOURCE_DIR", help = "Project directory to copy from")]
    pub source_dir: PathBuf,

    #[arg(long, env = "UCLONE_SOURCE_NAME", help = "Current project name")]
    pub source_name: String,

    #[arg(long, env = "UCLONE_TARGET_DIR", help = "Directory to create the renamed copy in")]
    pub target_dir: PathBuf,

    #[arg(long, env = "UCLONE_TARGET_NAME", help = "New project name")]
    pub target_name: String,

    #[arg(long, env = "UCLONE_FORCE_DELETE", help = "Delete the target directory first if it exists")]
    pub force_delete: bool,

    #[arg(
        long,
        env = "UCLONE_WHITELIST_DIRS",
        value_delimiter = ',',
        help = "Top-level directories to copy [default: Config,Content,Source]"
    )]
    pub whitelist_dirs: Vec<String>,

    #[arg(
        long,
        env = "UCLONE_WHITELIST_BINARY",
        value_delimiter = ',',
        help = "Extensions copied verbatim [default: uasset,png,jpg,jpeg,wav,umap]"
    )]
    pub whitelist_binary: Vec<String>,

    #[arg(
        long,
        env = "UCLONE_WHITELIST_ASCII",
        value_delimiter = ',',
        help = "Extensions copied and renamed [default: ini,cpp,h,uproject,sln,cs,gitignore,md,txt]"
    )]
    pub whitelist_ascii: Vec<String>,

    #[arg(long, help = "Perform a dry run without making changes")]
    pub dry_run: bool,

    #[arg(short, long, help = "Ask before deleting an existing target directory")]
    pub interactive: bool,

    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn clone_request(&self) -> CloneRequest {
        let whitelists = Whitelists::new(
            non_empty(&self.whitelist_dirs),
            non_empty(&self.whitelist_binary),
            non_empty(&self.whitelist_ascii),
        );
        CloneRequest::new(&self.source_dir, &self.source_name, &self.target_dir, &self.target_name)
            .with_whitelists(whitelists)
    }

    pub fn clone_options(&self) -> CloneOptions {
        CloneOptions {
            force_delete: self.force_delete,
            dry_run: self.dry_run,
        }
    }
}

fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
