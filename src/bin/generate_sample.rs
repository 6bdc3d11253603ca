//! Writes `sample_prospects.csv`, a deterministic prospect list with the
//! columns the filter panel knows about, plus the kind of mess real sheets
//! carry (stray whitespace, blanks, unparseable numbers).

use anyhow::{Context, Result};

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// True with probability `1 / n`.
    fn one_in(&mut self, n: usize) -> bool {
        self.below(n) == 0
    }
}

const KEYWORDS: &[&str] = &["crm", "payroll", "analytics", "logistics", "security"];
const INDUSTRIES: &[&str] = &["Tech", "Finance", "Healthcare", "Retail", "Manufacturing"];
const SIZE_BANDS: &[&str] = &["1-10", "11-50", "51-200", "201-500", "501-1000", "1000+"];
const CITIES: &[&str] = &[
    "London, UK",
    "Paris, FR",
    "Berlin, DE",
    "New York, US",
    "Austin, US",
    "Lisbon, PT",
];
const TITLES: &[&str] = &[
    "CEO",
    "CTO",
    "VP Sales",
    "Head of Marketing",
    "Sales Manager",
    "Data Analyst",
    "Operations Director",
];
const FIRST_NAMES: &[&str] = &["Ada", "Grace", "Alan", "Linus", "Barbara", "Ken", "Margaret"];
const LAST_NAMES: &[&str] = &["Lovelace", "Hopper", "Turing", "Torvalds", "Liskov", "Thompson"];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = "sample_prospects.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record([
        "Name",
        " Keyword",
        "Industry",
        "Headcount",
        "Employee Size",
        "Company Location",
        "Title",
        "Person Location",
    ])?;

    let n_rows = 250;
    for _ in 0..n_rows {
        let name = format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(LAST_NAMES));

        // Trailing whitespace and case drift, as typed by hand.
        let mut industry = rng.pick(INDUSTRIES).to_string();
        if rng.one_in(10) {
            industry.push(' ');
        }
        if rng.one_in(15) {
            industry = industry.to_lowercase();
        }

        let headcount = if rng.one_in(20) {
            String::new()
        } else if rng.one_in(25) {
            "unknown".to_string()
        } else {
            (5 + rng.below(4995)).to_string()
        };

        let person_location = if rng.one_in(8) {
            String::new()
        } else {
            rng.pick(CITIES).to_string()
        };

        writer.write_record([
            name.as_str(),
            rng.pick(KEYWORDS),
            industry.as_str(),
            headcount.as_str(),
            rng.pick(SIZE_BANDS),
            rng.pick(CITIES),
            rng.pick(TITLES),
            person_location.as_str(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {n_rows} prospects to {output_path}");
    Ok(())
}
