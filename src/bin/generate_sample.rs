use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Box-Muller transform for normal deviates.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn main() {
    let mut rng = StdRng::seed_from_u64(42);

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record(["temperature", "pressure", "flow_rate", "batch", "sensor_id"])
        .expect("Failed to write header");

    let batches = ["Batch_A", "Batch_B", "Batch_C"];
    let mut row_id: i64 = 0;

    for (b_idx, batch) in batches.iter().enumerate() {
        let base_temp = 20.0 + b_idx as f64 * 2.5;

        for _ in 0..100 {
            let temperature = gauss(&mut rng, base_temp, 1.2);
            // Pressure tracks temperature so the pairplot shows structure.
            let pressure = gauss(&mut rng, 101.3 + 0.4 * (temperature - base_temp), 0.8);
            let flow = gauss(&mut rng, 5.0, 0.5);

            // A few missing flow readings.
            let flow_field = if rng.gen::<f64>() < 0.02 {
                String::new()
            } else {
                format!("{flow:.3}")
            };

            writer
                .write_record([
                    format!("{temperature:.3}"),
                    format!("{pressure:.3}"),
                    flow_field,
                    batch.to_string(),
                    row_id.to_string(),
                ])
                .expect("Failed to write row");
            row_id += 1;
        }
    }

    // Inject a handful of obvious outliers for anomaly detection to find.
    for _ in 0..5 {
        let temperature = gauss(&mut rng, 80.0, 5.0);
        let pressure = gauss(&mut rng, 40.0, 3.0);
        let flow = gauss(&mut rng, 25.0, 2.0);
        writer
            .write_record([
                format!("{temperature:.3}"),
                format!("{pressure:.3}"),
                format!("{flow:.3}"),
                "Batch_X".to_string(),
                row_id.to_string(),
            ])
            .expect("Failed to write row");
        row_id += 1;
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {row_id} rows to {output_path}");
}
