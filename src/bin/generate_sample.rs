//! Writes `gapminder_sample.parquet`, a synthetic table with the Gapminder
//! layout, for trying the dashboard offline.

use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// (continent, countries, base lifeExp 1952, base gdpPercap 1952, base pop)
const CONTINENTS: [(&str, &[&str], f64, f64, f64); 5] = [
    ("Africa", &["Kenya", "Chad", "Ghana", "Mali", "Niger"], 39.0, 1100.0, 5.0e6),
    ("Americas", &["Brazil", "Canada", "Chile", "Peru"], 53.0, 4000.0, 1.5e7),
    ("Asia", &["Japan", "India", "Nepal", "Vietnam", "Jordan"], 46.0, 1800.0, 3.0e7),
    ("Europe", &["France", "Norway", "Poland", "Spain"], 64.0, 5600.0, 1.2e7),
    ("Oceania", &["Australia", "New Zealand"], 69.0, 10_000.0, 5.0e6),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [lo, hi)
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

#[derive(Default)]
struct Columns {
    country: Vec<String>,
    year: Vec<i64>,
    pop: Vec<i64>,
    continent: Vec<String>,
    life_exp: Vec<f64>,
    gdp_percap: Vec<f64>,
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let mut cols = Columns::default();

    for (continent, countries, life_base, gdp_base, pop_base) in CONTINENTS {
        for &country in countries {
            // Per-country spread around the continent baseline.
            let life0 = life_base * rng.range(0.85, 1.15);
            let gdp0 = gdp_base * rng.range(0.5, 2.0);
            let pop0 = pop_base * rng.range(0.2, 5.0);
            let gdp_growth = rng.range(0.005, 0.035);
            let pop_growth = rng.range(0.01, 0.03);

            for year in (1952..=2007).step_by(5) {
                let t = f64::from(year - 1952);
                let life = (life0 + t * rng.range(0.15, 0.4)).min(83.0);
                let gdp = gdp0 * (1.0 + gdp_growth).powf(t) * rng.range(0.95, 1.05);
                let pop = pop0 * (1.0 + pop_growth).powf(t);

                cols.country.push(country.to_string());
                cols.year.push(i64::from(year));
                cols.pop.push(pop.round() as i64);
                cols.continent.push(continent.to_string());
                cols.life_exp.push((life * 1000.0).round() / 1000.0);
                cols.gdp_percap.push(gdp);
            }
        }
    }

    let rows = cols.country.len();
    let schema = Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("pop", DataType::Int64, false),
        Field::new("continent", DataType::Utf8, false),
        Field::new("lifeExp", DataType::Float64, false),
        Field::new("gdpPercap", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(cols.country)),
            Arc::new(Int64Array::from(cols.year)),
            Arc::new(Int64Array::from(cols.pop)),
            Arc::new(StringArray::from(cols.continent)),
            Arc::new(Float64Array::from(cols.life_exp)),
            Arc::new(Float64Array::from(cols.gdp_percap)),
        ],
    )
    .context("Failed to create RecordBatch")?;

    let output_path = "gapminder_sample.parquet";
    let file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create {output_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;

    println!("Wrote {rows} country-year records to {output_path}");
    Ok(())
}
