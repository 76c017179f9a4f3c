use chrono::{Duration, NaiveDate};

/// Minimal deterministic PRNG (splitmix64)
struct SampleRng {
    state: u64,
}

impl SampleRng {
    fn new(seed: u64) -> Self {
        SampleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() {
    let mut rng = SampleRng::new(42);

    let regions = ["North", "South", "East", "West"];
    let products = [("Widget", 9.5), ("Gadget", 24.0), ("Gizmo", 59.0)];
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");

    let output_path = "sample_sales.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record(["order_date", "region", "product", "units", "unit_price", "revenue"])
        .expect("Failed to write header");

    let n_rows = 240;
    for _ in 0..n_rows {
        let date = start + Duration::days((rng.next_u64() % 366) as i64);
        let region = rng.pick(&regions);
        let (product, base_price) = *rng.pick(&products);
        let units = 1 + (rng.next_u64() % 20) as i64;
        // Price jitter of ±10 % around the list price.
        let unit_price = (base_price * rng.range(0.9, 1.1) * 100.0).round() / 100.0;
        let revenue = (units as f64 * unit_price * 100.0).round() / 100.0;

        writer
            .write_record([
                date.format("%Y-%m-%d").to_string(),
                region.to_string(),
                product.to_string(),
                units.to_string(),
                format!("{unit_price:.2}"),
                format!("{revenue:.2}"),
            ])
            .expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {n_rows} orders to {output_path}");
}
