use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::warn;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use vocab_review::config::Config;
use vocab_review::engine::aggregator::aggregate;
use vocab_review::engine::classifier::{DifficultyTag, build_profiles};
use vocab_review::engine::plan::{Plan, PlanCap};
use vocab_review::engine::scheduler::{GoalStatus, MAX_PREVIEW_DAYS, compute_all, schedule};
use vocab_review::engine::selector::{ReviewCriteria, WordRange};
use vocab_review::session::builder::{Session, build_from_goal, build_from_range, select_review};
use vocab_review::session::word::TestMode;
use vocab_review::store::json_store::JsonStore;
use vocab_review::store::{AttemptSource, Entitlements, GoalSource};

#[derive(Parser)]
#[command(name = "vocab-review", version, about = "Daily vocabulary goals and weak-word review")]
struct Cli {
    #[arg(long, help = "Directory holding goals.json, attempts.json, catalog.json, profile.json")]
    data_dir: Option<String>,

    #[arg(long, help = "Evaluate as of this date (YYYY-MM-DD) instead of today")]
    date: Option<NaiveDate>,

    #[arg(long, help = "Seed for word sampling")]
    seed: Option<u64>,

    #[arg(short, long, help = "Question direction (word-meaning, meaning-word)")]
    mode: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show today's word range for every goal
    Today,
    /// Preview the first days of each goal's schedule
    Schedule {
        #[arg(short, long)]
        days: Option<usize>,
    },
    /// Summarize weak words per textbook
    Weak,
    /// Build a quiz from today's range of a goal
    Goal {
        #[arg(short, long, help = "Textbook of the goal (defaults to the first goal)")]
        textbook: Option<String>,
    },
    /// Build a quiz from a word range
    Range {
        #[arg(short, long)]
        textbook: String,
        #[arg(long, value_parser = parse_range, help = "Word range, e.g. 1-100")]
        range: WordRange,
        #[arg(short, long, default_value_t = 10)]
        count: usize,
    },
    /// Build a weak-word review quiz
    Review {
        #[arg(short, long)]
        textbook: String,
        #[arg(long)]
        recent: bool,
        #[arg(long)]
        frequent: bool,
        #[arg(long)]
        single: bool,
        #[arg(long, value_parser = parse_range)]
        range: Option<WordRange>,
        #[arg(short, long)]
        count: Option<usize>,
    },
}

fn parse_range(s: &str) -> Result<WordRange, String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got {s:?}"))?;
    let start: u32 = start.trim().parse().map_err(|e| format!("bad range start: {e}"))?;
    let end: u32 = end.trim().parse().map_err(|e| format!("bad range end: {e}"))?;
    Ok(WordRange::new(start, end))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(mode) = cli.mode {
        config.test_mode = mode;
    }
    config.validate();

    let store = JsonStore::with_base_dir(config.data_dir())?;
    let calendar = config.calendar();
    let today = cli.date.unwrap_or_else(|| calendar.today());
    let mode = config.test_mode();
    let plan_cap = config.plan_cap(Plan::from_unlimited(store.is_unlimited()));
    let mut rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    match cli.command {
        Command::Today => {
            let goals = store.active_goals()?;
            if goals.is_empty() {
                println!("No goals configured.");
            }
            for (goal, status) in goals.iter().zip(compute_all(&goals, today)) {
                match status {
                    Ok(GoalStatus::Active(a)) => println!(
                        "{}: words {}-{} ({} words, day {})",
                        a.textbook_id,
                        a.start,
                        a.end,
                        a.word_count(),
                        a.day_index + 1
                    ),
                    Ok(GoalStatus::NotYetActive { starts_on }) => {
                        println!("{}: starts on {starts_on}", goal.textbook_id)
                    }
                    Err(err) => println!("{}: {err}", goal.textbook_id),
                }
            }
        }
        Command::Schedule { days } => {
            let days = days.unwrap_or(config.schedule_preview_days).min(MAX_PREVIEW_DAYS);
            for goal in store.active_goals()? {
                println!("{} ({} words/day)", goal.textbook_id, goal.daily_goal);
                match schedule(&goal, days) {
                    Ok(entries) => {
                        for day in entries {
                            println!("  {}  {}-{}", day.date.format("%m/%d"), day.start, day.end);
                        }
                    }
                    Err(err) => println!("  {err}"),
                }
            }
        }
        Command::Weak => {
            let profiles = build_profiles(&aggregate(&store.attempts_with_mistakes()?), &calendar, today);
            if profiles.is_empty() {
                println!("No weak words yet.");
            }
            for profile in profiles {
                let counts: Vec<String> = [DifficultyTag::Recent, DifficultyTag::Frequent, DifficultyTag::Single]
                    .into_iter()
                    .map(|tag| format!("{} {}", tag.label(), profile.count_for(tag)))
                    .collect();
                println!("{}: {} words ({})", profile.textbook, profile.words.len(), counts.join(", "));
                for w in &profile.words {
                    println!(
                        "  #{:<5} {}  x{}  [{}]",
                        w.stat.word_number,
                        w.stat.word,
                        w.stat.wrong_count,
                        w.classification.primary.label()
                    );
                }
            }
        }
        Command::Goal { textbook } => {
            let goals = store.active_goals()?;
            let goal = match &textbook {
                Some(name) => goals.iter().find(|g| &g.textbook_id == name),
                None => goals.first(),
            };
            let Some(goal) = goal else {
                bail!("no goal configured{}", textbook.map(|t| format!(" for {t}")).unwrap_or_default());
            };
            match build_from_goal(&store, goal, today, mode, plan_cap, &mut rng)? {
                Some(session) => print_session(&session),
                None => println!("{}: goal starts on {}", goal.textbook_id, goal.start_date),
            }
        }
        Command::Range {
            textbook,
            range,
            count,
        } => {
            warn_if_capped(plan_cap, count);
            let words = build_from_range(&store, &textbook, range, count, plan_cap, &mut rng)?;
            print_session(&Session::range(&textbook, range, mode, words));
        }
        Command::Review {
            textbook,
            recent,
            frequent,
            single,
            range,
            count,
        } => {
            let count = count.unwrap_or(config.review_count);
            let any = recent || frequent || single;
            let criteria = ReviewCriteria {
                include_recent: recent || !any,
                include_frequent: frequent || !any,
                include_single: single || !any,
                range,
                requested_count: count,
            };
            warn_if_capped(plan_cap, count);
            let profiles = build_profiles(&aggregate(&store.attempts_with_mistakes()?), &calendar, today);
            let session = select_review(&profiles, &textbook, &criteria, mode, plan_cap, &mut rng)
                .with_context(|| format!("building review for {textbook}"))?;
            print_session(&session);
        }
    }

    Ok(())
}

fn warn_if_capped(plan_cap: PlanCap, requested: usize) {
    if let PlanCap::Limited(cap) = plan_cap
        && requested > cap
    {
        warn!("free plan sessions hold at most {cap} words; requested {requested}, upgrade for larger tests");
    }
}

fn print_session(session: &Session) {
    let header = match session.mode {
        TestMode::WordToMeaning => "word -> meaning",
        TestMode::MeaningToWord => "meaning -> word",
    };
    println!("{} [{}], {} questions", session.title, header, session.len());
    for w in &session.words {
        println!(
            "{:>3}. #{:<5} {}  =>  {}",
            w.position,
            w.word_number,
            w.prompt(session.mode),
            w.answer(session.mode)
        );
    }
}
