use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const GENDERS: [&str; 2] = ["female", "male"];
const RACES: [&str; 5] = ["group A", "group B", "group C", "group D", "group E"];
const EDUCATION: [&str; 6] = [
    "some high school",
    "high school",
    "some college",
    "associate's degree",
    "bachelor's degree",
    "master's degree",
];
const LUNCH: [&str; 2] = ["standard", "free/reduced"];
const PREP: [&str; 2] = ["none", "completed"];

const HEADER: [&str; 8] = [
    "gender",
    "race/ethnicity",
    "parental level of education",
    "lunch",
    "test preparation course",
    "math score",
    "reading score",
    "writing score",
];

/// Write a synthetic StudentsPerformance table (.csv, or .parquet/.pq).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Output file; the extension picks the format
    #[arg(default_value = "StudentsPerformance.csv")]
    output: PathBuf,

    /// Number of students to generate
    #[arg(default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    count: u64,

    /// Seed for the random generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

struct Student {
    categories: [&'static str; 5],
    scores: [i64; 3],
}

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

fn generate<R: Rng + ?Sized>(n: u64, rng: &mut R) -> Result<Vec<Student>> {
    let ability_dist = Normal::new(66.0, 12.0)?;
    let math_noise = Normal::new(0.0, 6.0)?;
    let verbal_noise = Normal::new(0.0, 5.0)?;

    let students = (0..n)
        .map(|_| {
            let gender = pick(rng, &GENDERS);
            let education = pick(rng, &EDUCATION);
            let lunch = pick(rng, &LUNCH);
            let prep = pick(rng, &PREP);
            let race = pick(rng, &RACES);

            // Shared ability term so the three subjects correlate.
            let mut ability: f64 = ability_dist.sample(rng);
            if lunch == "standard" {
                ability += 4.0;
            }
            if prep == "completed" {
                ability += 5.0;
            }
            let gender_shift = if gender == "male" { 4.0 } else { -3.0 };
            let clamp = |v: f64| v.round().clamp(0.0, 100.0) as i64;
            let math = clamp(ability + gender_shift + math_noise.sample(rng));
            let reading = clamp(ability - gender_shift + verbal_noise.sample(rng));
            let writing = clamp(ability - gender_shift + verbal_noise.sample(rng));

            Student {
                categories: [gender, race, education, lunch, prep],
                scores: [math, reading, writing],
            }
        })
        .collect();
    Ok(students)
}

fn write_csv(path: &Path, students: &[Student]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(HEADER)?;
    for s in students {
        let scores = s.scores.map(|v| v.to_string());
        writer.write_record(s.categories.iter().copied().chain(scores.iter().map(String::as_str)))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, students: &[Student]) -> Result<()> {
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    for (col, name) in HEADER[..5].iter().enumerate() {
        fields.push(Field::new(*name, DataType::Utf8, false));
        let values: Vec<&str> = students.iter().map(|s| s.categories[col]).collect();
        columns.push(Arc::new(StringArray::from(values)));
    }
    for (col, name) in HEADER[5..].iter().enumerate() {
        fields.push(Field::new(*name, DataType::Int64, false));
        let values: Vec<i64> = students.iter().map(|s| s.scores[col]).collect();
        columns.push(Arc::new(Int64Array::from(values)));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let preview = pretty_format_batches(&[batch.slice(0, batch.num_rows().min(5))])?;
    log::info!("First rows:\n{preview}");

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let output_path = args.output;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let students = generate(args.count, &mut rng)?;

    let is_parquet = output_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));
    if is_parquet {
        write_parquet(&output_path, &students)?;
    } else {
        write_csv(&output_path, &students)?;
    }

    println!("Wrote {} students to {}", students.len(), output_path.display());
    Ok(())
}
