use data_loader::DataIndex;
use std::path::Path;
use std::time::Instant;

fn main() {
    let path = Path::new("data/seed.json");

    println!("Loading seed data...\n");

    let start = Instant::now();
    let index = DataIndex::load_from_file(path).expect("Failed to load seed data");
    let elapsed = start.elapsed();

    let (businesses, users, ratings) = index.counts();
    let stats = index.compute_business_stats();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Businesses: {}", businesses);
    println!("Users: {}", users);
    println!("Ratings: {}", ratings);
    println!("Rated businesses: {}", stats.len());
}
