//! `build` subcommand: parse, pair and extract across games

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::BuildArgs;
use crate::config::{Config, CorpusConfig};
use crate::glossary::builder::{EntryBuilder, SkipTally};
use crate::glossary::document::{GameStatistics, GlossaryDocument};
use crate::glossary::{Game, GlossaryEntry};
use crate::report;
use crate::terms::patterns::{PatternTable, TermPatterns};
use crate::terms::{TermAccumulator, TermExtractor, TermIndex};
use crate::tra::{self, ParsedFile};

const DEFAULT_SOURCE_DIR: &str = "source_tra";
const DEFAULT_OUTPUT: &str = "glossary.json";
const REPORT_LIMIT: usize = 20;

/// Everything a build needs, with CLI flags already layered over config.
pub struct BuildPlan {
    pub games: Vec<Game>,
    pub source_dir: PathBuf,
    pub output: PathBuf,
    pub indent: usize,
    pub corpus: CorpusConfig,
    pub include_stats: bool,
    pub extractor: Option<TermExtractor>,
}

impl BuildPlan {
    pub fn resolve(args: &BuildArgs, config: &Config) -> Result<Self> {
        let mut games = if args.games.is_empty() {
            Game::ALL.to_vec()
        } else {
            args.games.clone()
        };
        games.sort();
        games.dedup();

        let source_dir = args
            .source_dir
            .clone()
            .or_else(|| config.general.source_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR));

        let output = args
            .output
            .clone()
            .or_else(|| config.general.output.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let extractor = if args.wants_terms() {
            let patterns_file = args
                .patterns
                .clone()
                .or_else(|| config.extraction.patterns_file.as_ref().map(PathBuf::from));
            let patterns = load_patterns(patterns_file.as_deref())?;
            Some(TermExtractor::new(
                config.extraction.to_extraction_config(),
                patterns,
            ))
        } else {
            None
        };

        Ok(Self {
            games,
            source_dir,
            output,
            indent: args.indent.unwrap_or(config.general.indent),
            corpus: config.corpus.clone(),
            include_stats: args.include_stats,
            extractor,
        })
    }

    pub fn tra_path(&self, game: Game, lang: &str) -> PathBuf {
        self.source_dir
            .join(game.as_str())
            .join(lang)
            .join(&self.corpus.file_name)
    }
}

fn load_patterns(path: Option<&Path>) -> Result<TermPatterns> {
    let table = match path {
        Some(path) => {
            tracing::info!("Loading pattern table from {}", path.display());
            PatternTable::load(path)?
        }
        None => PatternTable::builtin()?,
    };
    Ok(table.compile()?)
}

/// Result of one game's parse/pair/accumulate pass.
pub struct GameOutput {
    pub game: Game,
    pub entries: Vec<GlossaryEntry>,
    pub skipped: SkipTally,
    pub terms: Option<TermAccumulator>,
}

pub struct BuildResult {
    pub entries: Vec<GlossaryEntry>,
    pub statistics: BTreeMap<String, GameStatistics>,
    pub terms: Option<TermIndex>,
}

pub fn run(args: BuildArgs) -> Result<()> {
    let config = Config::load()?;
    let plan = BuildPlan::resolve(&args, &config)?;

    let names: Vec<&str> = plan.games.iter().map(Game::as_str).collect();
    println!(
        "{}",
        format!("[Build] Games: {}", names.join(", ")).green()
    );
    println!("  Source: {}", plan.source_dir.display());

    let result = execute(&plan)?;

    let mut document = GlossaryDocument::new(
        &plan.games,
        result.entries,
        result.terms.clone().unwrap_or_default(),
    );
    if plan.include_stats {
        document = document.with_statistics(result.statistics.clone());
    }
    document.write(&plan.output, plan.indent)?;

    for (game, stats) in &result.statistics {
        println!(
            "  {}: {} entries ({} gendered), {} skipped",
            game,
            stats.total,
            stats.with_gender_variant,
            stats.skipped.total()
        );
    }
    println!(
        "{}",
        format!(
            "[OK] Wrote {} entries to {}",
            document.metadata.total_entries,
            plan.output.display()
        )
        .green()
    );

    if let Some(index) = &result.terms {
        println!("{}", format!("[Terms] {} terms extracted", index.len()).cyan());

        if let Some(path) = &args.nouns_output {
            let nouns = report::NounGlossary::from_index(index);
            nouns.write(path, plan.indent)?;
            println!(
                "{}",
                format!(
                    "[OK] Wrote {} nouns to {}",
                    nouns.metadata.total_terms,
                    path.display()
                )
                .green()
            );
        }

        if args.report {
            report::print_consistency_report(index, REPORT_LIMIT);
        }
    }

    Ok(())
}

/// Process every game in parallel, then merge partial term counts in game
/// order and finalize them once.
pub fn execute(plan: &BuildPlan) -> Result<BuildResult> {
    let pb = ProgressBar::new(plan.games.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let outputs = plan
        .games
        .par_iter()
        .map(|&game| {
            let output = process_game(plan, game);
            pb.inc(1);
            pb.set_message(game.as_str());
            output
        })
        .collect::<Result<Vec<_>>>();
    pb.finish_and_clear();
    let outputs = outputs?;

    let mut entries = Vec::new();
    let mut statistics = BTreeMap::new();
    let mut merged: Option<TermAccumulator> = None;

    for output in outputs {
        statistics.insert(
            output.game.to_string(),
            GameStatistics::collect(&output.entries, output.skipped),
        );
        if let Some(acc) = output.terms {
            match merged.as_mut() {
                Some(total) => total.merge(acc),
                None => merged = Some(acc),
            }
        }
        entries.extend(output.entries);
    }

    let terms = match (&plan.extractor, merged) {
        (Some(extractor), Some(acc)) => {
            tracing::info!(
                "Merged {} candidate terms from {} entries",
                acc.candidate_count(),
                acc.entries_seen()
            );
            Some(extractor.finalize(&acc))
        }
        _ => None,
    };

    Ok(BuildResult {
        entries,
        statistics,
        terms,
    })
}

pub fn process_game(plan: &BuildPlan, game: Game) -> Result<GameOutput> {
    let source_path = plan.tra_path(game, &plan.corpus.source_lang);
    let target_path = plan.tra_path(game, &plan.corpus.target_lang);

    let (source, target) = rayon::join(
        || load_tra(&source_path),
        || load_tra(&target_path),
    );
    let source = source.with_context(|| format!("Failed to load {} source corpus", game))?;
    let target = target.with_context(|| format!("Failed to load {} target corpus", game))?;

    if source.stats.anomalous > 0 {
        tracing::warn!(
            "{} source file has {} records with unexpected segment counts",
            game,
            source.stats.anomalous
        );
    }

    let built = EntryBuilder::new(game).build(&source.records, &target.records);
    let terms = plan
        .extractor
        .as_ref()
        .map(|extractor| extractor.accumulate(&built.entries));

    Ok(GameOutput {
        game,
        entries: built.entries,
        skipped: built.skipped,
        terms,
    })
}

fn load_tra(path: &Path) -> Result<ParsedFile> {
    if !path.is_file() {
        anyhow::bail!("TRA file not found: {}", path.display());
    }
    Ok(tra::parse_file(path)?)
}
