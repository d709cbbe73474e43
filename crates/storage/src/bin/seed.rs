use std::fmt;
use std::path::{Path, PathBuf};

use quiz_core::model::Overview;
use storage::repository::QuizRecord;
use storage::sqlite::SqliteRepository;

#[derive(Debug, Clone)]
struct Args {
    dir: PathBuf,
    overwrite: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDir { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDir { raw } => write!(f, "invalid --dir value: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut dir = std::env::var("QUIZ_BANK_DIR")
            .map_or_else(|_| PathBuf::from("assets/database"), PathBuf::from);
        let mut overwrite = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dir" => {
                    let value = require_value(&mut args, "--dir")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDir { raw: value });
                    }
                    dir = PathBuf::from(value);
                }
                "--overwrite" => overwrite = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { dir, overwrite })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dir <path>      Quiz bank directory (default: assets/database)");
    eprintln!("  --overwrite       Rewrite banks that already exist");
    eprintln!("  -h, --help        Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_BANK_DIR");
}

struct SampleBank {
    file: &'static str,
    name: &'static str,
    description: &'static str,
    quizzes: &'static [(&'static str, &'static str, &'static str)],
}

const TYPING_WORDS: SampleBank = SampleBank {
    file: "typing_words.db",
    name: "Typing: common words",
    description: "Type the word exactly as shown.",
    quizzes: &[
        ("because", "because", ""),
        ("through", "through", ""),
        ("language", "language", ""),
        ("keyboard", "keyboard", ""),
        ("practice", "practice", ""),
        ("question", "question", ""),
        ("separate", "separate", "Often misspelled as \"seperate\"."),
        ("necessary", "necessary", "One c, two s."),
        ("rhythm", "rhythm", ""),
        ("definitely", "definitely", ""),
    ],
};

const PREFECTURAL_CAPITALS: SampleBank = SampleBank {
    file: "prefectural_capitals.db",
    name: "都道府県庁所在地",
    description: "都道府県名から県庁所在地を答えてください。",
    quizzes: &[
        ("北海道", "札幌市\t札幌\tさっぽろし\tさっぽろ", ""),
        ("宮城県", "仙台市\t仙台\tせんだいし\tせんだい", ""),
        ("茨城県", "水戸市\t水戸\tみとし\tみと", ""),
        ("栃木県", "宇都宮市\t宇都宮\tうつのみやし\tうつのみや", ""),
        ("群馬県", "前橋市\t前橋\tまえばしし\tまえばし", ""),
        ("埼玉県", "さいたま市\tさいたま", ""),
        ("東京都", "新宿区\t新宿\tしんじゅくく\tしんじゅく", "都庁は新宿区にあります。"),
        ("神奈川県", "横浜市\t横浜\tよこはまし\tよこはま", ""),
        ("石川県", "金沢市\t金沢\tかなざわし\tかなざわ", ""),
        ("山梨県", "甲府市\t甲府\tこうふし\tこうふ", ""),
        ("愛知県", "名古屋市\t名古屋\tなごやし\tなごや", ""),
        ("三重県", "津市\t津\tつし\tつ", "日本で最も短い市名です。"),
        ("滋賀県", "大津市\t大津\tおおつし\tおおつ", ""),
        ("兵庫県", "神戸市\t神戸\tこうべし\tこうべ", ""),
        ("島根県", "松江市\t松江\tまつえし\tまつえ", ""),
        ("香川県", "高松市\t高松\tたかまつし\tたかまつ", ""),
        ("愛媛県", "松山市\t松山\tまつやまし\tまつやま", ""),
        ("沖縄県", "那覇市\t那覇\tなはし\tなは", ""),
    ],
};

const SAMPLE_BANKS: [SampleBank; 2] = [TYPING_WORDS, PREFECTURAL_CAPITALS];

async fn seed_bank(dir: &Path, bank: &SampleBank, overwrite: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let path = dir.join(bank.file);
    if path.exists() && !overwrite {
        return Ok(false);
    }
    let repo = SqliteRepository::create_bank(&path).await?;
    let quizzes: Vec<QuizRecord> = bank
        .quizzes
        .iter()
        .map(|(question, answer, explanation)| QuizRecord::new(*question, *answer, *explanation))
        .collect();
    repo.write_bank(&Overview::new(bank.name, bank.description), &quizzes)
        .await?;
    repo.pool().close().await;
    Ok(true)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    std::fs::create_dir_all(&args.dir)?;
    for bank in &SAMPLE_BANKS {
        if seed_bank(&args.dir, bank, args.overwrite).await? {
            println!("Wrote {} ({} quizzes)", bank.file, bank.quizzes.len());
        } else {
            println!("Skipped {} (already exists)", bank.file);
        }
    }
    println!("Quiz banks ready in {}", args.dir.display());

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
