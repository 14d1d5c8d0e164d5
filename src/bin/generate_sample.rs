use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Float64Builder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Write deterministic sample sales and insurance data.
#[derive(Debug, Parser)]
struct Args {
    /// Output directory
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

struct Order {
    order_id: String,
    time: String,
    city: &'static str,
    customer_type: &'static str,
    gender: &'static str,
    product_line: &'static str,
    total: f64,
    rating: Option<f64>,
}

const CITIES: [&str; 3] = ["Yangon", "Naypyitaw", "Mandalay"];
const CUSTOMER_TYPES: [&str; 2] = ["Member", "Normal"];
const GENDERS: [&str; 2] = ["Female", "Male"];
const PRODUCT_LINES: [&str; 6] = [
    "Electronic accessories",
    "Fashion accessories",
    "Food and beverages",
    "Health and beauty",
    "Home and lifestyle",
    "Sports and travel",
];

fn pick<T: Copy>(rng: &mut ChaCha8Rng, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

fn generate_orders(rng: &mut ChaCha8Rng, n: usize) -> Vec<Order> {
    (0..n)
        .map(|i| {
            let unit_price: f64 = rng.gen_range(10.0..100.0);
            let quantity: u32 = rng.gen_range(1..=10);
            let total = (unit_price * quantity as f64 * 1.05 * 100.0).round() / 100.0;
            // Roughly one order in forty has no rating.
            let rating = if rng.gen_ratio(1, 40) {
                None
            } else {
                Some((rng.gen_range(4.0..10.0_f64) * 10.0).round() / 10.0)
            };
            Order {
                order_id: format!("{:03}-{:02}-{:04}", 100 + i % 900, i % 97, i),
                // Store hours 10:00–20:59
                time: format!(
                    "{:02}:{:02}:00",
                    rng.gen_range(10..21),
                    rng.gen_range(0..60)
                ),
                city: pick(rng, &CITIES),
                customer_type: pick(rng, &CUSTOMER_TYPES),
                gender: pick(rng, &GENDERS),
                product_line: pick(rng, &PRODUCT_LINES),
                total,
                rating,
            }
        })
        .collect()
}

fn write_sales_csv(path: &Path, orders: &[Order]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "order_id",
        "time",
        "city",
        "customer_type",
        "gender",
        "product_line",
        "total",
        "rating",
    ])?;
    for o in orders {
        writer.write_record([
            o.order_id.clone(),
            o.time.clone(),
            o.city.to_string(),
            o.customer_type.to_string(),
            o.gender.to_string(),
            o.product_line.to_string(),
            o.total.to_string(),
            o.rating.map(|r| r.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_sales_parquet(path: &Path, orders: &[Order]) -> anyhow::Result<()> {
    let text = |f: fn(&Order) -> &str| -> StringArray { orders.iter().map(|o| Some(f(o))).collect() };

    let mut totals = Float64Builder::new();
    let mut ratings = Float64Builder::new();
    for o in orders {
        totals.append_value(o.total);
        ratings.append_option(o.rating);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("order_id", DataType::Utf8, false),
        Field::new("time", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("customer_type", DataType::Utf8, false),
        Field::new("gender", DataType::Utf8, false),
        Field::new("product_line", DataType::Utf8, false),
        Field::new("total", DataType::Float64, false),
        Field::new("rating", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|o| o.order_id.as_str())),
            Arc::new(text(|o| o.time.as_str())),
            Arc::new(text(|o| o.city)),
            Arc::new(text(|o| o.customer_type)),
            Arc::new(text(|o| o.gender)),
            Arc::new(text(|o| o.product_line)),
            Arc::new(totals.finish()),
            Arc::new(ratings.finish()),
        ],
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Charges grow with age, BMI and children; smoking dominates.
fn write_insurance_csv(path: &Path, rng: &mut ChaCha8Rng, n: usize) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["age", "sex", "bmi", "children", "smoker", "region", "charges"])?;
    for _ in 0..n {
        let age: u32 = rng.gen_range(18..65);
        let bmi: f64 = (rng.gen_range(16.0..48.0_f64) * 100.0).round() / 100.0;
        let children: u32 = rng.gen_range(0..=5);
        let smoker = rng.gen_bool(0.2);
        let sex = pick(rng, &["female", "male"]);
        let region = pick(rng, &["northeast", "southeast", "northwest", "southwest"]);

        let mut charges = 250.0 * age as f64 + 320.0 * (bmi - 25.0).max(0.0) + 480.0 * children as f64;
        if smoker {
            charges += 23_000.0;
        }
        charges += rng.gen_range(-1500.0..1500.0);
        let charges = (charges.max(1100.0) * 100.0).round() / 100.0;

        writer.write_record([
            age.to_string(),
            sex.to_string(),
            bmi.to_string(),
            children.to_string(),
            if smoker { "yes" } else { "no" }.to_string(),
            region.to_string(),
            charges.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    std::fs::create_dir_all(&args.out_dir)?;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let orders = generate_orders(&mut rng, 1000);

    let csv_path = args.out_dir.join("supermarket_sales.csv");
    write_sales_csv(&csv_path, &orders)?;
    let parquet_path = args.out_dir.join("supermarket_sales.parquet");
    write_sales_parquet(&parquet_path, &orders)?;
    let insurance_path = args.out_dir.join("insurance.csv");
    write_insurance_csv(&insurance_path, &mut rng, 1338)?;

    println!(
        "Wrote {} orders to {} and {}, and 1338 policyholders to {}",
        orders.len(),
        csv_path.display(),
        parquet_path.display(),
        insurance_path.display()
    );
    Ok(())
}
