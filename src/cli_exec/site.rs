use std::time::Duration;

use anyhow::{Context, Result};

use afterlife::codec;
use afterlife::config::SiteConfig;
use afterlife::fsutil::write_atomic;
use afterlife::model::DeviceStatus;
use afterlife::remote::ContentStoreClient;
use afterlife::site::{
    DataFetcher, DataSource, DetailOutcome, DeviceFilter, SiteBuilder, cache_bust, catalog,
    detail, generate, render,
};

use crate::cli_commands::SiteCommands;
use crate::cli_commands::site::{
    BuildArgs, BustCacheArgs, DeviceArgs, DevicesArgs, GenerateArgs, OtaSourceArgs,
};
use crate::cli_runtime::Ctx;

pub(super) fn handle_site_command(ctx: &Ctx, command: SiteCommands) -> Result<()> {
    match command {
        SiteCommands::Build(args) => build(ctx, args),
        SiteCommands::Devices(args) => devices(ctx, args),
        SiteCommands::Device(args) => device(ctx, args),
        SiteCommands::BustCache(args) => bust_cache(args),
    }
}

fn ttl(cfg: &SiteConfig) -> Duration {
    Duration::from_secs(cfg.site.cache_ttl_secs)
}

/// `--ota-dir`, then `--raw-base`, then the configured raw-content root.
fn ota_source(cfg: &SiteConfig, args: &OtaSourceArgs) -> DataSource {
    if let Some(dir) = &args.ota_dir {
        return DataSource::Local(dir.clone());
    }
    let mut ota = cfg.ota.clone();
    if let Some(base) = &args.raw_base {
        ota.raw_base = base.clone();
    }
    DataSource::remote(&ota.raw_root())
}

fn ota_fetcher(cfg: &SiteConfig, args: &OtaSourceArgs) -> Result<DataFetcher> {
    Ok(DataFetcher::new(ota_source(cfg, args), ttl(cfg))?)
}

fn build(ctx: &Ctx, args: BuildArgs) -> Result<()> {
    let mut cfg = ctx.cfg.clone();
    if let Some(dir) = args.data_dir {
        cfg.site.data_dir = dir;
    }
    let builder = SiteBuilder::from_config(&cfg, Some(ota_source(&cfg, &args.ota)))?;
    let report = builder.build(&args.out)?;

    for w in &report.warnings {
        eprintln!("warning: {}", w);
    }
    println!(
        "Wrote {} pages to {} ({} devices, {} changelog entries)",
        report.pages.len(),
        args.out.display(),
        report.devices,
        report.changelog_entries
    );
    Ok(())
}

fn devices(ctx: &Ctx, args: DevicesArgs) -> Result<()> {
    let fetcher = ota_fetcher(&ctx.cfg, &args.ota)?;
    let mut cards = catalog::load_catalog(&fetcher).context("load devices")?;
    let highlight = args
        .user_agent
        .as_deref()
        .and_then(|ua| catalog::highlight_first(&mut cards, ua));

    let filter = match &args.query {
        Some(qs) => DeviceFilter::from_query_string(qs),
        None => {
            let status = match args.status.as_deref() {
                Some(s) => Some(
                    DeviceStatus::parse(s)
                        .with_context(|| format!("unknown status {:?} (active|inactive)", s))?,
                ),
                None => None,
            };
            DeviceFilter {
                query: args.search.clone(),
                status,
                brand: args.brand.clone(),
            }
        }
    };
    let outcome = filter.apply(&cards);

    if args.json {
        let visible: Vec<_> = outcome.visible.iter().map(|c| &c.device).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&visible).context("serialize devices json")?
        );
        return Ok(());
    }
    if args.html {
        println!(
            "{}",
            render::render_device_grid(outcome.visible.iter().copied(), highlight.as_deref())
        );
        return Ok(());
    }

    if !outcome.has_visible() {
        println!("No devices found.");
        return Ok(());
    }
    for card in &outcome.visible {
        let d = &card.device;
        let mark = if highlight.as_deref() == Some(d.codename.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {:<14} {:<28} {:<10} {:<8} {}",
            mark,
            d.codename,
            d.name,
            d.brand,
            d.status.label(),
            card.variant_badges().join(",")
        );
    }
    if outcome.hidden > 0 {
        println!("({} hidden by filter)", outcome.hidden);
    }
    Ok(())
}

fn device(ctx: &Ctx, args: DeviceArgs) -> Result<()> {
    let fetcher = ota_fetcher(&ctx.cfg, &args.ota)?;
    let cards = catalog::load_catalog(&fetcher).context("load devices")?;
    let card = cards
        .iter()
        .find(|c| c.device.codename.eq_ignore_ascii_case(&args.codename))
        .with_context(|| format!("unknown device: {}", args.codename))?;

    match detail::open_detail(&fetcher, card) {
        DetailOutcome::Ready(d) => println!("{}", detail::render_detail(&d)),
        DetailOutcome::NoBuilds => println!("No builds available for {} yet.", card.device.name),
    }
    Ok(())
}

fn bust_cache(args: BustCacheArgs) -> Result<()> {
    let version = args.version.unwrap_or_else(cache_bust::timestamp_version);
    let report = cache_bust::bust_cache(&args.root, &version)?;
    for page in &report.updated {
        println!("updated {}", page.display());
    }
    println!(
        "Updated {} of {} HTML files (v={})",
        report.updated.len(),
        report.scanned,
        report.version
    );
    Ok(())
}

pub(super) fn generate_devices(ctx: &Ctx, args: GenerateArgs) -> Result<()> {
    let mut ota = ctx.cfg.ota.clone();
    if let Some(base) = args.raw_base {
        ota.raw_base = base;
    }
    let client = ContentStoreClient::anonymous(&ota.api_base)?;
    let raw = DataFetcher::new(DataSource::remote(&ota.raw_root()), ttl(&ctx.cfg))?;

    let index = generate::generate_devices_index(&client, &raw, &ota).context("list OTA tree")?;
    for codename in &index.skipped {
        eprintln!("warning: skipped {} (missing or invalid updates.json)", codename);
    }

    let mut json = codec::encode_pretty(&index.file)?;
    json.push('\n');
    write_atomic(&args.out, json.as_bytes())?;
    println!(
        "Wrote {} devices to {}",
        index.file.devices.len(),
        args.out.display()
    );
    Ok(())
}
