use chained_hash::DefaultHashBuilder;
use chained_hash::FixedTable;
use chained_hash::TableBuilder;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    /// Number of entries the table accepts.
    #[arg(short = 'c', long = "capacity", default_value_t = 1000)]
    capacity: usize,

    /// Percentage of the capacity to fill, may exceed 100 to exercise rejection.
    #[arg(short = 'f', long = "fill", default_value_t = 100)]
    fill_percent: usize,

    /// Upper bound on the bucket array.
    #[arg(short = 'm', long = "max_buckets")]
    max_buckets: Option<usize>,
}

fn main() {
    let args = Args::parse();

    println!("Creating FixedTable with capacity: {}", args.capacity);

    let mut builder = TableBuilder::<DefaultHashBuilder>::new(args.capacity);
    if let Some(max) = args.max_buckets {
        builder = builder.max_bucket_count(max);
    }
    let mut table: FixedTable<u64, DefaultHashBuilder> = builder.build();

    println!("Bucket count: {}", table.bucket_count());

    let attempts = args.capacity * args.fill_percent / 100;
    println!("Setting {attempts} keys...");

    let mut num_rejected = 0;
    for i in 0..attempts as u64 {
        if !table.set(&format!("key_{i:016X}"), i) {
            num_rejected += 1;
        }
    }

    println!("Stored {} entries", table.len());
    println!("Final load: {:.2}%", table.load() * 100.0);

    table.chain_histogram().print();
    table.debug_stats().print();
    println!(
        "Rejected set attempts: {} ({:.02}%)",
        num_rejected,
        if attempts == 0 {
            0.0
        } else {
            num_rejected as f64 / attempts as f64 * 100.0
        }
    );
}
