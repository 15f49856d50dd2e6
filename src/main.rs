#[macro_use] extern crate rocket;
#[macro_use] extern crate log;


mod config;
mod db;
mod logger;
mod report_route;
mod risk;
mod util;


use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use log::LevelFilter;
use rocket::{
    data::Limits,
    figment::Figment,
    fs::NamedFile,
    Build, Rocket, State,
};

use crate::config::{AppConfig, SetupError};
use crate::db::ReportStore;


#[get("/")]
async fn index(config: &State<AppConfig>) -> Option<NamedFile> {
    NamedFile::open(config.public_dir.join("index.html")).await.ok()
}

#[get("/report")]
async fn report_page(config: &State<AppConfig>) -> Option<NamedFile> {
    NamedFile::open(config.public_dir.join("report.html")).await.ok()
}

#[get("/<file..>", rank = 10)]
async fn get_public_file(file: PathBuf, config: &State<AppConfig>) -> Option<NamedFile> {
    NamedFile::open(config.public_dir.join(file)).await.ok()
}

#[get("/uploads/<file..>")]
async fn get_upload_file(file: PathBuf, config: &State<AppConfig>) -> Option<NamedFile> {
    NamedFile::open(config.upload_dir.join(file)).await.ok()
}


pub fn build_rocket(figment: Figment) -> Result<Rocket<Build>, SetupError> {
    let config = AppConfig::from_figment(&figment)?;

    config.prepare_dirs()?;
    let store = ReportStore::open(&config.reports_file)?;
    info!("Reports stored in {}", store.path().display());

    let base_limits = figment.extract_inner::<Limits>("limits").unwrap_or_default();
    let figment = figment.merge(("limits", config.limits(base_limits)));

    Ok(rocket::custom(figment)
        .manage(config)
        .manage(Arc::new(store))
        .mount("/", routes![
            index,
            report_page,
            get_public_file,
            get_upload_file,
        ])
        .mount("/", report_route::routes())
        .register("/api", report_route::catchers()))
}


#[rocket::main]
async fn main() {
    let _sentry = match logger::init(LevelFilter::Info) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Logger setup failed: {}", err);
            None
        },
    };

    let rocket = match build_rocket(rocket::Config::figment()) {
        Ok(rocket) => rocket,
        Err(err) => {
            error!("Server setup failed: {}", err);
            process::exit(1);
        },
    };

    if let Err(err) = rocket.launch().await {
        error!("Server stopped: {}", err);
        process::exit(1);
    }
}
