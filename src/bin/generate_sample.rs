use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

const LISTING_COUNT: usize = 120;

const MODELS: [(&str, &str); 8] = [
    ("Peugeot 208", "hatchback"),
    ("Renault Clio", "hatchback"),
    ("Volkswagen Golf", "hatchback"),
    ("Dacia Duster", "suv"),
    ("Peugeot 3008", "suv"),
    ("Tesla Model 3", "sedan"),
    ("Renault Kangoo", "van"),
    ("BMW Série 3 Touring", "estate"),
];
const FUELS: [&str; 4] = ["diesel", "petrol", "hybrid", "electric"];
const TRANSMISSIONS: [&str; 2] = ["manual", "automatic"];
const CITIES: [&str; 6] = ["Paris", "Lyon", "Marseille", "Toulouse", "Nantes", "Lille"];
const COMMENTS: [&str; 5] = [
    "Prix élevé pour le kilométrage, à éviter.",
    "Quelques frais à prévoir, négociable.",
    "Annonce correcte, dans la moyenne du marché.",
    "Bon rapport qualité/prix, entretien suivi.",
    "Excellente affaire, historique complet.",
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

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.range(0, items.len() as u64 - 1) as usize]
    }
}

/// French-style thousands grouping with spaces: 12345 → "12 345".
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// One listing's fields in column order.
struct SampleListing {
    title: String,
    url: String,
    price: String,
    mileage: String,
    year: String,
    city: String,
    fuel_type: String,
    transmission: String,
    body_type: String,
    description: String,
    ai_comment: String,
    ai_note: Option<i64>,
}

fn generate(rng: &mut SimpleRng, id: usize) -> SampleListing {
    let (model, body_type) = MODELS[rng.range(0, MODELS.len() as u64 - 1) as usize];
    let fuel = if model.starts_with("Tesla") {
        "electric"
    } else {
        rng.pick(&FUELS)
    };
    let year = rng.range(2008, 2024);
    let age = 2025 - year;
    let km = age * rng.range(8_000, 20_000);
    let price = (30_000u64.saturating_sub(age * 1_600)).max(2_500) + rng.range(0, 6_000);
    let note = rng.range(1, 5) as i64;

    // Some listings carry the scraper's placeholders.
    let year_text = if rng.range(0, 19) == 0 { "N/A".to_string() } else { year.to_string() };
    let mileage_text = if rng.range(0, 24) == 0 {
        "N/A".to_string()
    } else {
        format!("{} km", group_thousands(km))
    };
    let price_text = if rng.range(0, 29) == 0 {
        "Prix sur demande".to_string()
    } else {
        format!("{} €", group_thousands(price))
    };

    SampleListing {
        title: format!("{model} {fuel} {year}"),
        url: format!("https://example.com/annonces/{id}"),
        price: price_text,
        mileage: mileage_text,
        year: year_text,
        city: rng.pick(&CITIES).to_string(),
        fuel_type: fuel.to_string(),
        transmission: rng.pick(&TRANSMISSIONS).to_string(),
        body_type: body_type.to_string(),
        description: format!("{model} de {year}, {} km, contrôle technique OK.", group_thousands(km)),
        ai_comment: COMMENTS[(note - 1) as usize].to_string(),
        ai_note: (rng.range(0, 39) != 0).then_some(note),
    }
}

fn write_json(listings: &[SampleListing], path: &str) -> Result<()> {
    let records: Vec<_> = listings
        .iter()
        .map(|l| {
            json!({
                "title": l.title,
                "url": l.url,
                "price": l.price,
                "mileage": l.mileage,
                "year": l.year,
                "city": l.city,
                "fuel_type": l.fuel_type,
                "transmission": l.transmission,
                "body_type": l.body_type,
                "description": l.description,
                "ai_comment": l.ai_comment,
                "ai_note": l.ai_note,
            })
        })
        .collect();
    let text = serde_json::to_string_pretty(&records).context("serializing listings")?;
    std::fs::write(path, text).with_context(|| format!("writing {path}"))
}

fn write_parquet(listings: &[SampleListing], path: &str) -> Result<()> {
    let text_columns: [(&str, fn(&SampleListing) -> &str); 11] = [
        ("title", |l| &l.title),
        ("url", |l| &l.url),
        ("price", |l| &l.price),
        ("mileage", |l| &l.mileage),
        ("year", |l| &l.year),
        ("city", |l| &l.city),
        ("fuel_type", |l| &l.fuel_type),
        ("transmission", |l| &l.transmission),
        ("body_type", |l| &l.body_type),
        ("description", |l| &l.description),
        ("ai_comment", |l| &l.ai_comment),
    ];

    let mut fields: Vec<Field> = text_columns
        .iter()
        .map(|(name, _)| Field::new(*name, DataType::Utf8, false))
        .collect();
    fields.push(Field::new("ai_note", DataType::Int64, true));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<arrow::array::ArrayRef> = text_columns
        .iter()
        .map(|(_, get)| {
            Arc::new(StringArray::from(listings.iter().map(get).collect::<Vec<_>>()))
                as arrow::array::ArrayRef
        })
        .collect();
    columns.push(Arc::new(Int64Array::from(
        listings.iter().map(|l| l.ai_note).collect::<Vec<_>>(),
    )));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let listings: Vec<SampleListing> = (0..LISTING_COUNT).map(|i| generate(&mut rng, i)).collect();

    write_json(&listings, "sample_listings.json")?;
    write_parquet(&listings, "sample_listings.parquet")?;

    println!(
        "Wrote {} listings to sample_listings.json and sample_listings.parquet",
        listings.len()
    );
    Ok(())
}
