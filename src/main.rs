use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use vehicle_annot_rust::cli::{Cli, Commands};
use vehicle_annot_rust::merge::{merge_boxes, MergeConfig};
use vehicle_annot_rust::{filename, scanner, sidecar, AnnotConfig, Result};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AnnotConfig::load_from(path)?,
        None => AnnotConfig::load()?,
    };

    match cli.command {
        Commands::Merge { folder, classes, iou, center_factor, dry_run } => {
            println!("vehicle-annot - batch merge\n");

            let merge_config = MergeConfig {
                mergeable_classes: classes.unwrap_or(config.mergeable_classes),
                iou_threshold: iou.unwrap_or(config.merge_iou),
                center_factor: center_factor.unwrap_or(config.merge_center_factor),
            };

            println!("[1/2] scanning {} ...", folder.display());
            let images = scanner::scan_folder_recursive(&folder)?;
            println!("  {} images found\n", images.len());

            println!(
                "[2/2] merging classes {:?} (iou > {}, center factor {}){}",
                merge_config.mergeable_classes,
                merge_config.iou_threshold,
                merge_config.center_factor,
                if dry_run { " [dry run]" } else { "" }
            );

            let bar = ProgressBar::new(images.len() as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:40}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );

            let mut processed = 0usize;
            let mut total_merged = 0usize;
            let mut skipped_corrupt = 0usize;

            for img in &images {
                bar.inc(1);
                let json_path = sidecar::sidecar_path(&img.path);

                let loaded = match sidecar::load(&json_path) {
                    Ok(l) => l,
                    Err(err) => {
                        skipped_corrupt += 1;
                        eprintln!("skipping {}: {}", img.file_name, err);
                        continue;
                    }
                };
                if loaded.boxes.is_empty() {
                    continue;
                }
                processed += 1;

                let (merged, count) = merge_boxes(&loaded.boxes, &merge_config);
                if count == 0 {
                    continue;
                }
                total_merged += count;

                if cli.verbose {
                    bar.println(format!("{}: merged {} boxes", img.file_name, count));
                }
                if !dry_run {
                    sidecar::save(&json_path, &merged, &loaded.ocr_records, &loaded.extra_entries)?;
                }
            }
            bar.finish_and_clear();

            println!("\ntotal images:     {}", images.len());
            println!("with annotations: {}", processed);
            println!("boxes merged:     {}", total_merged);
            if skipped_corrupt > 0 {
                println!("skipped (corrupt sidecar): {}", skipped_corrupt);
            }
            println!("\ndone");
        }

        Commands::Count { folder } => {
            println!("vehicle-annot - class statistics\n");

            let images = scanner::scan_folder_recursive(&folder)?;
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            let mut annotated = 0usize;

            for img in &images {
                let loaded = match sidecar::load(&sidecar::sidecar_path(&img.path)) {
                    Ok(l) => l,
                    Err(err) => {
                        eprintln!("skipping {}: {}", img.file_name, err);
                        continue;
                    }
                };
                if !loaded.boxes.is_empty() {
                    annotated += 1;
                }
                for b in &loaded.boxes {
                    *counts.entry(b.class.to_lowercase()).or_default() += 1;
                }
            }

            let mut sorted: Vec<_> = counts.into_iter().collect();
            sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

            println!("images: {} ({} annotated)\n", images.len(), annotated);
            for (class, count) in sorted {
                println!("{:>8}  {}", count, class);
            }
        }

        Commands::Import { folder, classes, force } => {
            println!("vehicle-annot - legacy filename import\n");

            let known: Vec<String> = classes.unwrap_or_else(|| {
                filename::DEFAULT_KNOWN_CLASSES
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

            let images = scanner::scan_folder_recursive(&folder)?;
            let mut imported = 0usize;
            let mut skipped = 0usize;

            for img in &images {
                let json_path = sidecar::sidecar_path(&img.path);
                if json_path.exists() && !force {
                    skipped += 1;
                    continue;
                }

                let boxes = filename::decode(&img.file_name, &known);
                if boxes.is_empty() {
                    continue;
                }

                sidecar::save(&json_path, &boxes, &[], &[])?;
                imported += 1;
                if cli.verbose {
                    println!("{}: {} boxes", img.file_name, boxes.len());
                }
            }

            println!("imported {} sidecars ({} already present)", imported, skipped);
        }
    }

    Ok(())
}
