//! Redirect records for the engine configuration file.
//!
//! Binary assets store class paths qualified by the project name
//! (`/Script/MyProj.PlayerPawn`). After a rename those paths no longer exist, so
//! the engine is told where they went with `+ActiveGameNameRedirects` entries
//! appended to the `[/Script/Engine.Engine]` section. The class names to redirect
//! are taken from the `ActiveClassRedirects` lines of the original file, before
//! any renaming has touched it.

use regex::Regex;
use std::fmt;
use tracing::debug;

use crate::renamer::ProjectRenamer;

/// File name of the configuration file that receives redirect records.
pub const ENGINE_CONFIG_FILE: &str = "DefaultEngine.ini";

pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

const CLASS_REDIRECT_MARKER: &str = "ActiveClassRedirects";
const ENGINE_SECTION_HEADER: &str = "[/Script/Engine.Engine]";
const SCRIPT_PREFIX: &str = "/Script/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRecord {
    pub old_name: String,
    pub new_name: String,
}

impl RedirectRecord {
    /// Redirect for the project module itself.
    pub fn for_project(old_project: &str, new_project: &str) -> Self {
        Self {
            old_name: format!("{SCRIPT_PREFIX}{old_project}"),
            new_name: format!("{SCRIPT_PREFIX}{new_project}"),
        }
    }

    /// Redirect for a class qualified by the project module.
    pub fn for_class(old_project: &str, new_project: &str, class_name: &str) -> Self {
        Self {
            old_name: format!("{SCRIPT_PREFIX}{old_project}.{class_name}"),
            new_name: format!(
                "{SCRIPT_PREFIX}{new_project}.{}",
                class_name.replace(old_project, new_project)
            ),
        }
    }
}

impl fmt::Display for RedirectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+ActiveGameNameRedirects=(OldGameName=\"{}\", NewGameName=\"{}\")",
            self.old_name, self.new_name
        )
    }
}

pub struct Synthesis {
    pub content: String,
    pub records_injected: usize,
}

pub struct RedirectSynthesizer {
    class_name_pattern: Regex,
}

impl RedirectSynthesizer {
    pub fn new() -> Result<Self, regex::Error> {
        let class_name_pattern = Regex::new(r#"\bNewClassName="([^"]*)"#)?;
        Ok(Self { class_name_pattern })
    }

    /// Collects the `NewClassName` value of every `ActiveClassRedirects` line,
    /// in line order and with duplicates kept. At most one value per line.
    pub fn extract_class_names(&self, original: &str) -> Vec<String> {
        original
            .lines()
            .filter(|line| line.contains(CLASS_REDIRECT_MARKER))
            .filter_map(|line| self.class_name_pattern.captures(line))
            .filter_map(|caps| caps.get(1))
            .map(|found| found.as_str().to_string())
            .collect()
    }

    pub fn records(&self, original: &str, renamer: &ProjectRenamer) -> Vec<RedirectRecord> {
        let old_project = renamer.old_name();
        let new_project = renamer.new_name();

        let mut records = vec![RedirectRecord::for_project(old_project, new_project)];
        records.extend(
            self.extract_class_names(original)
                .iter()
                .map(|class_name| RedirectRecord::for_class(old_project, new_project, class_name)),
        );
        records
    }

    /// Rebuilds `renamed` line by line, injecting the redirect records right
    /// after each engine section header. Every output line, including the last,
    /// ends with [`LINE_SEPARATOR`].
    pub fn synthesize(&self, original: &str, renamed: &str, renamer: &ProjectRenamer) -> Synthesis {
        let records = self.records(original, renamer);
        debug!("Synthesizing {} redirect records", records.len());

        let mut content = String::with_capacity(renamed.len());
        let mut records_injected = 0;
        for line in renamed.lines() {
            content.push_str(line);
            content.push_str(LINE_SEPARATOR);

            if line.eq_ignore_ascii_case(ENGINE_SECTION_HEADER) {
                for record in &records {
                    content.push_str(&record.to_string());
                    content.push_str(LINE_SEPARATOR);
                }
                records_injected += records.len();
            }
        }

        Synthesis {
            content,
            records_injected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str = "[/Script/Engine.Engine]\n\
        +ActiveClassRedirects=(OldClassName=\"TP_ThirdPersonGameMode\",NewClassName=\"MyProjGameMode\")\n\
        +ActiveClassRedirects=(OldClassName=\"X\",NewClassName=\"PlayerPawn\")\n\
        \n\
        [/Script/HardwareTargeting.HardwareTargetingSettings]\n\
        TargetedHardwareClass=Desktop\n";

    fn renamer() -> ProjectRenamer {
        ProjectRenamer::new("MyProj", "NewProj")
    }

    #[test]
    fn test_extract_class_names() {
        let synthesizer = RedirectSynthesizer::new().unwrap();

        assert_eq!(
            synthesizer.extract_class_names(ORIGINAL),
            vec!["MyProjGameMode".to_string(), "PlayerPawn".to_string()]
        );
    }

    #[test]
    fn test_extract_keeps_duplicates_and_one_per_line() {
        let synthesizer = RedirectSynthesizer::new().unwrap();

        let original = "+ActiveClassRedirects=(NewClassName=\"A\",NewClassName=\"B\")\n\
            +ActiveClassRedirects=(OldClassName=\"Z\",NewClassName=\"A\")\n\
            NewClassName=\"Ignored\"\n";
        assert_eq!(synthesizer.extract_class_names(original), vec!["A", "A"]);
    }

    #[test]
    fn test_marker_line_without_class_name_adds_nothing() {
        let synthesizer = RedirectSynthesizer::new().unwrap();

        let original = "+ActiveClassRedirects=(OldClassName=\"A\")\n";
        assert!(synthesizer.extract_class_names(original).is_empty());
    }

    #[test]
    fn test_record_format() {
        let record = RedirectRecord::for_class("MyProj", "NewProj", "MyProjGameMode");

        assert_eq!(
            record.to_string(),
            "+ActiveGameNameRedirects=(OldGameName=\"/Script/MyProj.MyProjGameMode\", NewGameName=\"/Script/NewProj.NewProjGameMode\")"
        );
    }

    #[test]
    fn test_synthesize_injects_after_engine_section() {
        let synthesizer = RedirectSynthesizer::new().unwrap();
        let renamer = renamer();

        let original = "[/Script/Engine.Engine]\n\
            +ActiveClassRedirects=(OldClassName=\"X\",NewClassName=\"PlayerPawn\")\n";
        let renamed = renamer.rewrite(original);
        let synthesis = synthesizer.synthesize(original, &renamed, &renamer);

        let expected = [
            "[/Script/Engine.Engine]",
            "+ActiveGameNameRedirects=(OldGameName=\"/Script/MyProj\", NewGameName=\"/Script/NewProj\")",
            "+ActiveGameNameRedirects=(OldGameName=\"/Script/MyProj.PlayerPawn\", NewGameName=\"/Script/NewProj.PlayerPawn\")",
            "+ActiveClassRedirects=(OldClassName=\"X\",NewClassName=\"PlayerPawn\")",
            "",
        ]
        .join(LINE_SEPARATOR);
        assert_eq!(synthesis.content, expected);
        assert_eq!(synthesis.records_injected, 2);
    }

    #[test]
    fn test_record_count_matches_marker_lines() {
        let synthesizer = RedirectSynthesizer::new().unwrap();
        let renamer = renamer();

        let records = synthesizer.records(ORIGINAL, &renamer);
        let marker_lines = ORIGINAL.lines().filter(|l| l.contains("ActiveClassRedirects")).count();
        assert_eq!(records.len(), marker_lines + 1);
    }

    #[test]
    fn test_section_header_is_case_insensitive() {
        let synthesizer = RedirectSynthesizer::new().unwrap();

        let synthesis = synthesizer.synthesize("", "[/script/engine.engine]\n", &renamer());
        assert_eq!(synthesis.records_injected, 1);
        assert!(synthesis.content.contains("/Script/NewProj"));
    }

    #[test]
    fn test_without_section_header_content_is_only_normalized() {
        let synthesizer = RedirectSynthesizer::new().unwrap();

        let synthesis = synthesizer.synthesize(ORIGINAL, "a\r\nb", &renamer());
        assert_eq!(synthesis.records_injected, 0);
        assert_eq!(synthesis.content, format!("a{LINE_SEPARATOR}b{LINE_SEPARATOR}"));
    }
}
