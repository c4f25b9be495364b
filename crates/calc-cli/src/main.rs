mod config;

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use clap::{Parser, Subcommand};

use calc_core::calculator::{
    BasicInput, DerivativeInput, DeviationInput, FactorialInput, FractionInput, GpaInput,
    GradeInput, IntegralInput, LcmGcdInput, LinearInput, MatrixInput, NumberList,
    PercentageInput, PermutationInput, ProportionInput, QuadraticInput, RatioInput, TrigInput,
    ValuesInput, WeightedGradeInput,
};
use calc_core::fraction::FractionOp;
use calc_core::grades::{Assignment, Category, Course, GpaScale};
use calc_core::matrix::MatrixOp;
use calc_core::percentage::PercentageMode;
use calc_core::stats::DeviationKind;
use calc_core::trig::AngleUnit;
use calc_core::validation::NumberRule;
use calc_core::{CalcRequest, Computed, Fraction, HistoryStore, Matrix};
use calc_store::SqliteStore;

#[derive(Parser)]
#[command(
    name = "calc",
    version,
    about = "Step-by-step calculators with a persistent calculation history"
)]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log the calculation to the history store
    #[arg(long, global = true)]
    save: bool,

    /// Print the full result document as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Percent of a value, reverse percentage, increase or decrease
    Percent {
        /// of | reverse | increase | decrease
        mode: PercentageMode,
        #[arg(allow_negative_numbers = true)]
        a: f64,
        #[arg(allow_negative_numbers = true)]
        b: f64,
    },

    /// Simplify a ratio a:b
    Ratio {
        a: f64,
        b: f64,

        /// Solve a:b = c:x for x instead
        #[arg(long)]
        proportion: Option<f64>,
    },

    /// Mean, median, mode and range
    Average {
        /// Numbers, comma or space separated
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,
    },

    /// Descriptive statistics with variance
    Stats {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,
    },

    /// Standard deviation
    Stddev {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,

        /// Use the sample (n-1) formula
        #[arg(long)]
        sample: bool,
    },

    /// GPA from courses given as `grade:credits` or `name:grade:credits`
    Gpa {
        #[arg(required = true)]
        courses: Vec<String>,

        /// 4.0 or 5.0
        #[arg(long, default_value = "4.0")]
        scale: GpaScale,
    },

    /// Grade from assignments given as `score/max` or `name:score/max`
    Grade {
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Weighted grade from `score:weight` or `name:score:weight`
    Weighted {
        #[arg(required = true)]
        categories: Vec<String>,
    },

    /// n!
    Factorial {
        #[arg(allow_negative_numbers = true)]
        n: i64,
    },

    /// Permutations and combinations P(n,r), C(n,r)
    Perm {
        #[arg(allow_negative_numbers = true)]
        n: i64,
        #[arg(allow_negative_numbers = true)]
        r: i64,
    },

    /// LCM and GCD of two or more positive integers
    Lcm {
        #[arg(required = true, num_args = 2..)]
        numbers: Vec<u64>,
    },

    /// Solve ax + b = 0
    Linear {
        #[arg(allow_negative_numbers = true)]
        a: f64,
        #[arg(allow_negative_numbers = true)]
        b: f64,
    },

    /// Solve ax² + bx + c = 0
    Quadratic {
        #[arg(allow_negative_numbers = true)]
        a: f64,
        #[arg(allow_negative_numbers = true)]
        b: f64,
        #[arg(allow_negative_numbers = true)]
        c: f64,
    },

    /// Matrix operation; matrices are written `1,2;3,4`
    Matrix {
        /// add | subtract | multiply | transpose | determinant
        op: MatrixOp,
        #[arg(allow_hyphen_values = true)]
        a: Matrix,
        #[arg(allow_hyphen_values = true)]
        b: Option<Matrix>,
    },

    /// Fraction arithmetic, e.g. `calc fraction 1/2 + 1/3`
    Fraction {
        #[arg(allow_hyphen_values = true)]
        a: Fraction,
        #[arg(allow_hyphen_values = true)]
        op: FractionOp,
        #[arg(allow_hyphen_values = true)]
        b: Fraction,
    },

    /// Differentiate a polynomial, e.g. `calc derive "3x^2 + 2x + 1"`
    Derive {
        expression: String,

        #[arg(long, default_value = "x")]
        var: char,
    },

    /// Integrate a polynomial, optionally between --from and --to
    Integrate {
        expression: String,

        #[arg(long, default_value = "x")]
        var: char,

        #[arg(long, allow_negative_numbers = true, requires = "to")]
        from: Option<f64>,

        #[arg(long, allow_negative_numbers = true, requires = "from")]
        to: Option<f64>,
    },

    /// Six trigonometric ratios of an angle
    Trig {
        #[arg(allow_negative_numbers = true)]
        angle: f64,

        /// degrees | radians
        #[arg(long, default_value = "degrees")]
        unit: AngleUnit,
    },

    /// Evaluate an arithmetic expression
    Eval {
        #[arg(required = true, allow_hyphen_values = true)]
        expression: Vec<String>,
    },

    /// Show recent calculations of one calculator type
    History {
        /// Calculator type, e.g. `quadratic-equation`
        calculator_type: String,

        /// Maximum results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete expired calculations now
    Purge,

    /// Show history statistics
    Summary,

    /// Show the active configuration
    Config,

    /// Run the HTTP API
    Serve {
        /// Address to bind, overrides the config file
        #[arg(long)]
        bind: Option<String>,
    },
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "calchub", "calchub")
        .map(|dirs| dirs.data_dir().join("history.db"))
        .unwrap_or_else(|| PathBuf::from("history.db"))
}

fn open_store(db: Option<PathBuf>, cfg: &config::Config) -> Result<SqliteStore> {
    let path = db
        .or_else(|| cfg.store.path.as_ref().map(PathBuf::from))
        .unwrap_or_else(default_db_path);
    tracing::debug!(path = %path.display(), "opening history store");
    let store = SqliteStore::new(&path).context("failed to open database")?;
    Ok(store.with_ttl(Duration::days(cfg.history.ttl_days)))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;

    let request = match cli.command {
        Commands::History {
            calculator_type,
            limit,
        } => {
            let store = open_store(cli.db, &cfg)?;
            let limit = limit.unwrap_or(cfg.history.default_limit);
            return cmd_history(&store, &calculator_type, limit, cli.json);
        }
        Commands::Purge => return cmd_purge(&open_store(cli.db, &cfg)?),
        Commands::Summary => return cmd_summary(&open_store(cli.db, &cfg)?),
        Commands::Config => return cmd_config(&cfg),
        Commands::Serve { bind } => {
            let store = open_store(cli.db, &cfg)?;
            return cmd_serve(store, &cfg, bind);
        }
        other => calculator_request(other)?,
    };

    let computed = request.run()?;
    print_computed(&computed, cli.json)?;

    if cli.save {
        let store = open_store(cli.db, &cfg)?;
        let id = save_computed(&store, &request, computed)?;
        if !cli.json {
            println!("Saved: {id}");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Calculator commands
// ---------------------------------------------------------------------------

fn number_list(values: Vec<String>) -> NumberList {
    NumberList::Text(values.join(","))
}

fn calculator_request(command: Commands) -> Result<CalcRequest> {
    let request = match command {
        Commands::Percent { mode, a, b } => {
            CalcRequest::Percentage(PercentageInput { mode, a, b })
        }
        Commands::Ratio { a, b, proportion } => match proportion {
            Some(c) => CalcRequest::Proportion(ProportionInput { a, b, c }),
            None => CalcRequest::Ratio(RatioInput { a, b }),
        },
        Commands::Average { values } => CalcRequest::Average(ValuesInput {
            values: number_list(values),
        }),
        Commands::Stats { values } => CalcRequest::Statistics(ValuesInput {
            values: number_list(values),
        }),
        Commands::Stddev { values, sample } => CalcRequest::StandardDeviation(DeviationInput {
            values: number_list(values),
            kind: if sample {
                DeviationKind::Sample
            } else {
                DeviationKind::Population
            },
        }),
        Commands::Gpa { courses, scale } => CalcRequest::Gpa(GpaInput {
            scale,
            courses: courses
                .iter()
                .map(|c| parse_course(c))
                .collect::<Result<_>>()?,
        }),
        Commands::Grade { assignments } => CalcRequest::Grade(GradeInput {
            assignments: assignments
                .iter()
                .map(|a| parse_assignment(a))
                .collect::<Result<_>>()?,
        }),
        Commands::Weighted { categories } => CalcRequest::WeightedGrade(WeightedGradeInput {
            categories: categories
                .iter()
                .map(|c| parse_category(c))
                .collect::<Result<_>>()?,
        }),
        Commands::Factorial { n } => CalcRequest::Factorial(FactorialInput { n }),
        Commands::Perm { n, r } => {
            CalcRequest::PermutationCombination(PermutationInput { n, r })
        }
        Commands::Lcm { numbers } => CalcRequest::LcmGcd(LcmGcdInput { numbers }),
        Commands::Linear { a, b } => CalcRequest::LinearEquation(LinearInput { a, b }),
        Commands::Quadratic { a, b, c } => {
            CalcRequest::QuadraticEquation(QuadraticInput { a, b, c })
        }
        Commands::Matrix { op, a, b } => CalcRequest::Matrix(MatrixInput {
            operation: op,
            a,
            b,
        }),
        Commands::Fraction { a, op, b } => CalcRequest::Fraction(FractionInput {
            a,
            operation: op,
            b,
        }),
        Commands::Derive { expression, var } => CalcRequest::Derivative(DerivativeInput {
            expression,
            variable: var,
        }),
        Commands::Integrate {
            expression,
            var,
            from,
            to,
        } => CalcRequest::Integral(IntegralInput {
            expression,
            variable: var,
            lower: from,
            upper: to,
        }),
        Commands::Trig { angle, unit } => CalcRequest::Trigonometry(TrigInput { angle, unit }),
        Commands::Eval { expression } => CalcRequest::Basic(BasicInput {
            expression: expression.join(" "),
        }),
        Commands::History { .. }
        | Commands::Purge
        | Commands::Summary
        | Commands::Config
        | Commands::Serve { .. } => bail!("not a calculator command"),
    };
    Ok(request)
}

fn parse_f64(raw: &str, what: &str, rule: NumberRule) -> Result<f64> {
    rule.parse(raw).with_context(|| format!("invalid {what}: {raw}"))
}

fn non_negative() -> NumberRule {
    NumberRule {
        allow_negative: false,
        ..NumberRule::default()
    }
}

/// `A:3` or `Math:A:3`.
fn parse_course(raw: &str) -> Result<Course> {
    let parts: Vec<&str> = raw.split(':').collect();
    let (name, grade, credits) = match parts.as_slice() {
        [grade, credits] => ("", *grade, *credits),
        [name, grade, credits] => (*name, *grade, *credits),
        _ => bail!("course must be `grade:credits` or `name:grade:credits`, got `{raw}`"),
    };
    Ok(Course {
        name: name.trim().to_string(),
        grade: grade.trim().to_string(),
        credits: parse_f64(credits, "credits", non_negative())?,
    })
}

/// `18/20` or `Quiz:18/20`.
fn parse_assignment(raw: &str) -> Result<Assignment> {
    let (name, scores) = match raw.rsplit_once(':') {
        Some((name, scores)) => (name.trim(), scores),
        None => ("", raw),
    };
    let Some((score, max)) = scores.split_once('/') else {
        bail!("assignment must be `score/max` or `name:score/max`, got `{raw}`");
    };
    Ok(Assignment {
        name: name.to_string(),
        score: parse_f64(score, "score", non_negative())?,
        max_score: parse_f64(max, "max score", NumberRule::non_zero())?,
    })
}

/// `85:50` or `Tests:85:50`.
fn parse_category(raw: &str) -> Result<Category> {
    let parts: Vec<&str> = raw.split(':').collect();
    let (name, score, weight) = match parts.as_slice() {
        [score, weight] => ("", *score, *weight),
        [name, score, weight] => (*name, *score, *weight),
        _ => bail!("category must be `score:weight` or `name:score:weight`, got `{raw}`"),
    };
    Ok(Category {
        name: name.trim().to_string(),
        score: parse_f64(score, "score", non_negative())?,
        weight: parse_f64(weight, "weight", non_negative())?,
    })
}

fn print_computed(computed: &Computed, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(computed)?);
        return Ok(());
    }
    println!("{}", computed.calculator_type);
    println!("{}", "-".repeat(40));
    for (i, step) in computed.steps.iter().enumerate() {
        println!("{:>2}. {}: {}", i + 1, step.description, step.value);
    }
    println!();
    println!("Result: {}", computed.result);
    Ok(())
}

fn save_computed(store: &SqliteStore, request: &CalcRequest, computed: Computed) -> Result<String> {
    let input = request.input_json()?;
    let record = computed.into_record(input)?;
    Ok(store.save(record)?)
}

// ---------------------------------------------------------------------------
// History commands
// ---------------------------------------------------------------------------

fn cmd_history(store: &SqliteStore, calculator_type: &str, limit: usize, json: bool) -> Result<()> {
    let records = store.recent(calculator_type, limit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No history for {calculator_type}.");
        return Ok(());
    }
    for rec in &records {
        println!(
            "{}  {}  {}",
            rec.created_at.format("%Y-%m-%d %H:%M"),
            rec.id,
            rec.input
        );
        println!("    => {}", rec.result);
    }
    Ok(())
}

fn cmd_purge(store: &SqliteStore) -> Result<()> {
    let removed = store.purge_expired(chrono::Utc::now())?;
    println!("Purged {removed} expired calculations.");
    Ok(())
}

fn cmd_summary(store: &SqliteStore) -> Result<()> {
    let stats = store.stats()?;
    println!("Calculations: {}", stats.total_records);
    println!("Types:        {}", stats.total_types);
    if let Some(oldest) = stats.oldest_record {
        println!("Oldest:       {}", oldest.format("%Y-%m-%d %H:%M"));
    }
    if let Some(newest) = stats.newest_record {
        println!("Newest:       {}", newest.format("%Y-%m-%d %H:%M"));
    }

    let types = store.list_types()?;
    if !types.is_empty() {
        println!();
        println!("{:<30} Count", "Calculator");
        println!("{}", "-".repeat(40));
        for (calculator_type, count) in &types {
            println!("{calculator_type:<30} {count}");
        }
    }
    Ok(())
}

fn cmd_config(cfg: &config::Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[store]");
    println!(
        "  path = {}",
        cfg.store
            .path
            .clone()
            .unwrap_or_else(|| format!("{} (default)", default_db_path().display()))
    );
    println!();
    println!("[history]");
    println!("  ttl_days = {}", cfg.history.ttl_days);
    println!("  default_limit = {}", cfg.history.default_limit);
    println!("  purge_interval_secs = {}", cfg.history.purge_interval_secs);
    println!();
    println!("[server]");
    println!("  bind = {}", cfg.server.bind);
    Ok(())
}

fn cmd_serve(store: SqliteStore, cfg: &config::Config, bind: Option<String>) -> Result<()> {
    let opts = calc_api::ServerOptions {
        bind: bind.unwrap_or_else(|| cfg.server.bind.clone()),
        default_limit: cfg.history.default_limit,
        purge_interval: StdDuration::from_secs(cfg.history.purge_interval_secs),
    };
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(calc_api::serve(store, opts))
}
