//! Writes a deterministic synthetic `dataset.csv` so the dashboard can run
//! without the real city export. Headers are upper-case on purpose: the
//! loader is responsible for normalizing them.

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

    fn range(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items[self.range(items.len() as u64) as usize]
    }
}

const BOROUGHS: [&str; 5] = ["BROOKLYN", "QUEENS", "MANHATTAN", "BRONX", "STATEN ISLAND"];

const STREETS: [&str; 10] = [
    "BROADWAY",
    "ATLANTIC AVENUE",
    "FLATBUSH AVENUE",
    "NORTHERN BOULEVARD",
    "GRAND CONCOURSE",
    "QUEENS BOULEVARD",
    "OCEAN PARKWAY",
    "JAMAICA AVENUE",
    "3 AVENUE",
    "LINDEN BOULEVARD",
];

const FACTORS: [&str; 8] = [
    "Driver Inattention/Distraction",
    "Failure to Yield Right-of-Way",
    "Following Too Closely",
    "Unsafe Speed",
    "Backing Unsafely",
    "Passing or Lane Usage Improper",
    "Traffic Control Disregarded",
    "Unspecified",
];

const VEHICLE_TYPES: [&str; 7] = [
    "Sedan",
    "Station Wagon/Sport Utility Vehicle",
    "Taxi",
    "Pick-up Truck",
    "Box Truck",
    "Bike",
    "Bus",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = SimpleRng::new(42);
    let output_path = "dataset.csv";
    let mut writer = csv::Writer::from_path(output_path)?;

    writer.write_record([
        "CRASH_DATE",
        "CRASH_TIME",
        "LATITUDE",
        "LONGITUDE",
        "NUMBER_OF_PERSONS_INJURED",
        "NUMBER_OF_PEDESTRIANS_INJURED",
        "NUMBER_OF_CYCLIST_INJURED",
        "NUMBER_OF_MOTORIST_INJURED",
        "NUMBER_OF_PERSONS_KILLED",
        "BOROUGH",
        "ON_STREET_NAME",
        "OFF_STREET_NAME",
        "CONTRIBUTING_FACTOR_VEHICLE_1",
        "CONTRIBUTING_FACTOR_VEHICLE_2",
        "VEHICLE_TYPE_CODE_1",
        "VEHICLE_TYPE_CODE_2",
    ])?;

    let rows = 800;
    let mut kept = 0usize;
    for _ in 0..rows {
        let month = 1 + rng.range(12);
        let day = 1 + rng.range(28);
        let date = format!("{month:02}/{day:02}/2023");
        // Crashes skew towards rush hours.
        let hour = match rng.range(10) {
            0..=2 => 8 + rng.range(2),
            3..=6 => 16 + rng.range(3),
            _ => rng.range(24),
        };
        let time = format!("{hour}:{:02}", rng.range(60));

        // A few rows lose their coordinates, as the real export does.
        let (lat, lon) = if rng.next_f64() < 0.03 {
            (String::new(), String::new())
        } else {
            kept += 1;
            (
                format!("{:.5}", 40.50 + rng.next_f64() * 0.40),
                format!("{:.5}", -74.25 + rng.next_f64() * 0.55),
            )
        };

        let pedestrians = sometimes(&mut rng, 0.15, 3);
        let cyclists = sometimes(&mut rng, 0.10, 2);
        let motorists = sometimes(&mut rng, 0.30, 4);
        let persons = pedestrians + cyclists + motorists;
        let killed = if rng.next_f64() < 0.005 { 1 } else { 0 };

        let two_streets = rng.next_f64() < 0.4;
        let persons = persons.to_string();
        let pedestrians = pedestrians.to_string();
        let cyclists = cyclists.to_string();
        let motorists = motorists.to_string();
        let killed = killed.to_string();
        writer.write_record([
            date.as_str(),
            time.as_str(),
            lat.as_str(),
            lon.as_str(),
            persons.as_str(),
            pedestrians.as_str(),
            cyclists.as_str(),
            motorists.as_str(),
            killed.as_str(),
            rng.pick(&BOROUGHS),
            rng.pick(&STREETS),
            if two_streets { rng.pick(&STREETS) } else { "" },
            rng.pick(&FACTORS),
            if rng.next_f64() < 0.5 {
                rng.pick(&FACTORS)
            } else {
                ""
            },
            rng.pick(&VEHICLE_TYPES),
            if rng.next_f64() < 0.7 {
                rng.pick(&VEHICLE_TYPES)
            } else {
                ""
            },
        ])?;
    }
    writer.flush()?;

    println!("Wrote {rows} collisions ({kept} with coordinates) to {output_path}");
    Ok(())
}

fn sometimes(rng: &mut SimpleRng, p: f64, max: u64) -> u64 {
    if rng.next_f64() < p {
        1 + rng.range(max)
    } else {
        0
    }
}
