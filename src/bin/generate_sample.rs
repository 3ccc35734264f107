use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

const OUTPUT_PATH: &str = "data/input/bank-additional-full.csv";
const N_ROWS: usize = 4000;

const JOBS: [&str; 12] = [
    "admin.",
    "blue-collar",
    "entrepreneur",
    "housemaid",
    "management",
    "retired",
    "self-employed",
    "services",
    "student",
    "technician",
    "unemployed",
    "unknown",
];
const MARITAL: [&str; 4] = ["divorced", "married", "single", "unknown"];
const EDUCATION: [&str; 7] = [
    "basic.4y",
    "basic.6y",
    "basic.9y",
    "high.school",
    "professional.course",
    "university.degree",
    "unknown",
];
const YES_NO_UNKNOWN: [&str; 3] = ["no", "unknown", "yes"];
const CONTACT: [&str; 2] = ["cellular", "telephone"];
const MONTHS: [&str; 10] = ["mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];
const DAYS: [&str; 5] = ["mon", "tue", "wed", "thu", "fri"];
const POUTCOME: [&str; 3] = ["failure", "nonexistent", "success"];

/// SplitMix64 stream. Same seed, same file.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        let span = (hi - lo + 1) as u64;
        lo + (self.next_u64() % span) as i64
    }

    fn pick<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[(self.next_u64() % choices.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        unit < p
    }
}

fn main() -> Result<()> {
    let mut rng = SampleRng(42);

    if let Some(dir) = Path::new(OUTPUT_PATH).parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(OUTPUT_PATH)
        .with_context(|| format!("creating {OUTPUT_PATH}"))?;

    writer.write_record([
        "age", "job", "marital", "education", "default", "housing", "loan", "contact", "month",
        "day_of_week", "duration", "campaign", "pdays", "previous", "poutcome", "y",
    ])?;

    let mut accepted = 0;
    for _ in 0..N_ROWS {
        let age = rng.range(18, 88);
        let job = if age >= 65 && rng.chance(0.7) {
            "retired"
        } else if age <= 24 && rng.chance(0.5) {
            "student"
        } else {
            rng.pick(&JOBS)
        };
        let contact = rng.pick(&CONTACT);
        let duration = rng.range(5, 1200);
        let previous = if rng.chance(0.15) { rng.range(1, 4) } else { 0 };
        let poutcome = if previous == 0 { "nonexistent" } else { rng.pick(&POUTCOME) };

        // Long calls, prior success and cellular contact raise acceptance.
        let mut p_yes: f64 = 0.04 + duration as f64 / 4000.0;
        if poutcome == "success" {
            p_yes += 0.4;
        }
        if contact == "cellular" {
            p_yes += 0.03;
        }
        if job == "student" || job == "retired" {
            p_yes += 0.08;
        }
        let y = if rng.chance(p_yes.min(0.95)) { "yes" } else { "no" };
        if y == "yes" {
            accepted += 1;
        }

        writer.write_record([
            age.to_string().as_str(),
            job,
            rng.pick(&MARITAL),
            rng.pick(&EDUCATION),
            if rng.chance(0.8) { "no" } else { "unknown" },
            rng.pick(&YES_NO_UNKNOWN),
            rng.pick(&YES_NO_UNKNOWN),
            contact,
            rng.pick(&MONTHS),
            rng.pick(&DAYS),
            duration.to_string().as_str(),
            rng.range(1, 10).to_string().as_str(),
            if previous == 0 { "999" } else { "6" },
            previous.to_string().as_str(),
            poutcome,
            y,
        ])?;
    }
    writer.flush()?;

    println!("Wrote {N_ROWS} contacts ({accepted} accepted) to {OUTPUT_PATH}");
    Ok(())
}
