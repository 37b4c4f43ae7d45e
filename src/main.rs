use anyhow::{Context, Result, bail};

use workua_job_archiver::{CrawlEvent, CrawlOptions, Session, Settings, SiteRegistry, logging};

fn main() -> Result<()> {
    logging::init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        bail!("usage: workua_job_archiver <job title or keywords>");
    }

    let settings = Settings::load().context("Failed to load settings")?;
    let site = SiteRegistry::with_defaults().build(&settings.site, &settings)?;
    let mut session = Session::new(site, CrawlOptions::from_settings(&settings));

    println!("{}", session.check(&query)?);
    println!("It will take some time. Please wait...");

    let handle = session.start()?;
    for event in handle.events() {
        match event {
            CrawlEvent::Progress(progress) => println!("[{:>3}%] {}", progress.percent, progress.message),
            CrawlEvent::Finished => println!("Done!"),
            // The same error comes back from `wait` below.
            CrawlEvent::Failed(_) => {}
        }
    }

    handle.wait()?;
    Ok(())
}
