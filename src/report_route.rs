use std::{
    fmt,
    fs,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use rocket::{
    form::{self, error::ErrorKind, Errors, Form},
    fs::TempFile,
    http::Status,
    response::{
        content::RawJson,
        status::Custom,
    },
    tokio::task,
    Catcher, Request, Route, State,
};
use serde_json::json;

use crate::config::AppConfig;
use crate::db::{models::NewReport, ReportStore};
use crate::risk::{self, RiskLevel};
use crate::util;


type JsonResult = Result<RawJson<String>, Custom<RawJson<String>>>;


const UPLOAD_URL_PREFIX: &str = "/uploads";
const MISSING_PHOTO_MSG: &str = "請上傳照片";
const INVALID_FORM_MSG: &str = "表單格式錯誤";
const SERVER_ERROR_MSG: &str = "伺服器錯誤，請稍後再試";
const NOT_FOUND_MSG: &str = "找不到資源";


fn make_json_result(json: String) -> JsonResult {
    Ok(RawJson(json))
}

fn make_json_error(status: Status, err: &str) -> JsonResult {
    Err(json_error(status, err))
}

fn json_error(status: Status, err: &str) -> Custom<RawJson<String>> {
    Custom(status, RawJson(json!({ "error": err }).to_string()))
}

/// Runs file and lock work off the async workers.
async fn run_blocking<T, E, F>(job: F) -> Result<T, String>
    where F: FnOnce() -> Result<T, E> + Send + 'static,
          T: Send + 'static,
          E: fmt::Display + Send + 'static {

    match task::spawn_blocking(job).await {
        Ok(result) => result.map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    }
}


#[derive(FromForm)]
pub struct ReportForm<'r> {
    photo: form::Result<'r, TempFile<'r>>,
    #[field(name = "treeId")]
    tree_id: Option<String>,
    location: Option<String>,
    #[field(name = "problemType")]
    problem_type: Option<String>,
    #[field(name = "targetType")]
    target_type: Option<String>,
    description: Option<String>,
    contact: Option<String>,
    #[field(name = "riskLevel")]
    risk_level: Option<String>,
    #[field(name = "rootHeavePoint")]
    root_heave_point: Option<String>,
}

#[derive(FromForm)]
pub struct RiskQuery {
    #[field(name = "problemType")]
    problem_type: Option<String>,
}


pub fn routes() -> Vec<Route> {
    routes![
        get_reports,
        post_report,
        get_risk,
    ]
}

/// JSON error bodies for everything under `/api`.
pub fn catchers() -> Vec<Catcher> {
    catchers![
        unsupported_media_type,
        api_error,
    ]
}

// Bodies that are not forms carry no photo.
#[catch(415)]
pub fn unsupported_media_type() -> Custom<RawJson<String>> {
    json_error(Status::BadRequest, MISSING_PHOTO_MSG)
}

#[catch(default)]
pub fn api_error(status: Status, _req: &Request) -> Custom<RawJson<String>> {
    let message = match status.code {
        404 => NOT_FOUND_MSG,
        code if code >= 500 => SERVER_ERROR_MSG,
        _ => INVALID_FORM_MSG,
    };

    json_error(status, message)
}

#[get("/api/reports")]
pub async fn get_reports(store: &State<Arc<ReportStore>>) -> JsonResult {
    let store = Arc::clone(store.inner());
    let result = run_blocking(move || {
        store.get_reports()
            .and_then(|reports| Ok(serde_json::to_string(&reports)?))
    }).await;

    match result {
        Ok(json) => make_json_result(json),
        Err(err) => {
            error!("Fail to read reports: {}", err);
            make_json_error(Status::InternalServerError, SERVER_ERROR_MSG)
        },
    }
}

#[post("/api/report", data = "<form>")]
pub async fn post_report(
    form: Result<Form<ReportForm<'_>>, Errors<'_>>,
    store: &State<Arc<ReportStore>>,
    config: &State<AppConfig>,
) -> JsonResult {

    let form = match form {
        Ok(form) => form.into_inner(),
        Err(errors) => {
            warn!("Rejected report form: {}", errors);
            return make_json_error(errors.status(), INVALID_FORM_MSG);
        },
    };

    let mut photo = match form.photo {
        Ok(photo) if photo.len() > 0 => photo,
        Ok(_) => return make_json_error(Status::BadRequest, MISSING_PHOTO_MSG),
        Err(ref errors) if is_missing(errors) => {
            return make_json_error(Status::BadRequest, MISSING_PHOTO_MSG);
        },
        Err(errors) => {
            warn!("Rejected photo: {}", errors);
            return make_json_error(errors.status(), INVALID_FORM_MSG);
        },
    };


    // Reserve a unique file name, then fill it with the photo.
    let ext = photo_extension(&photo);
    let upload_dir = config.upload_dir.clone();
    let reserved = run_blocking(move || reserve_upload_file(&upload_dir, ext.as_deref())).await;
    let (file_name, path) = match reserved {
        Ok(reserved) => reserved,
        Err(err) => {
            error!("Fail to create upload file in {}: {}", config.upload_dir.display(), err);
            return make_json_error(Status::InternalServerError, SERVER_ERROR_MSG);
        },
    };

    if let Err(err) = photo.copy_to(&path).await {
        error!("Fail to save photo {}: {}", path.display(), err);
        let _ = rocket::tokio::fs::remove_file(&path).await;
        return make_json_error(Status::InternalServerError, SERVER_ERROR_MSG);
    }


    let new_report = NewReport {
        image_url: format!("{}/{}", UPLOAD_URL_PREFIX, file_name),
        tree_id: form.tree_id.unwrap_or_default(),
        location: form.location.unwrap_or_default(),
        problem_type: form.problem_type.unwrap_or_default(),
        target_type: form.target_type.unwrap_or_default(),
        description: form.description.unwrap_or_default(),
        contact: form.contact.unwrap_or_default(),
        risk_level: form.risk_level
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| RiskLevel::default().to_string()),
        root_heave_point: form.root_heave_point.unwrap_or_default(),
    };

    let store = Arc::clone(store.inner());
    match run_blocking(move || store.insert_report(new_report)).await {
        Ok(report) => {
            info!("New report {} with {}", report.id, report.image_url);
            make_json_result(json!({
                "success": true,
                "report": report,
            }).to_string())
        },
        Err(err) => {
            error!("Fail to add report: {}", err);
            let _ = rocket::tokio::fs::remove_file(&path).await;
            make_json_error(Status::InternalServerError, SERVER_ERROR_MSG)
        },
    }
}

#[get("/api/risk?<query..>")]
pub fn get_risk(query: RiskQuery) -> RawJson<String> {
    let level = risk::assess(query.problem_type.as_deref().unwrap_or_default());

    RawJson(json!({ "riskLevel": level.as_str() }).to_string())
}


fn is_missing(errors: &Errors<'_>) -> bool {
    errors.iter().all(|err| matches!(err.kind, ErrorKind::Missing))
}

fn photo_extension(photo: &TempFile<'_>) -> Option<String> {
    photo.raw_name()
        .and_then(|name| util::file_extension(name.dangerous_unsafe_unsanitized_raw().as_str()))
        .or_else(|| {
            photo.content_type()
                .and_then(|ct| ct.extension())
                .map(|ext| ext.as_str())
                .filter(|ext| util::is_safe_extension(ext))
        })
        .map(str::to_owned)
}

fn reserve_upload_file(dir: &Path, ext: Option<&str>) -> io::Result<(String, PathBuf)> {
    loop {
        let name = util::generate_upload_name(ext);
        let path = dir.join(&name);
        let file_result = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path);

        match file_result {
            Ok(_) => break Ok((name, path)),
            Err(ref err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => break Err(err),
        }
    }
}
