use crate::calendar::render_calendar;
use crate::errors::StorageError;
use crate::models::Occurrence;
use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Client};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::{fs, sync::watch};
use tracing::{error, info};

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Writes the calendar export after each save and pushes it to the
/// configured remote endpoint, if any.
#[derive(Clone)]
pub struct CalendarPublisher {
    calendar_path: PathBuf,
    uploads: Option<Arc<watch::Sender<Option<String>>>>,
}

impl CalendarPublisher {
    /// With a `sync_url`, spawns the upload worker, so this must run inside
    /// a tokio runtime.
    pub fn new(
        calendar_path: PathBuf,
        sync_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let uploads = match sync_url {
            Some(url) => {
                let client = build_client(timeout)?;
                let (tx, rx) = watch::channel(None);
                tokio::spawn(run_uploads(client, url, rx));
                Some(Arc::new(tx))
            }
            None => None,
        };
        Ok(Self {
            calendar_path,
            uploads,
        })
    }

    /// Renders and writes the export, then hands it to the upload worker.
    /// Upload failures are only logged.
    pub async fn publish(&self, occurrences: &[Occurrence]) -> Result<String, StorageError> {
        let body = render_calendar(occurrences, Utc::now());
        if let Some(parent) = self
            .calendar_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.calendar_path, &body).await?;

        if let Some(uploads) = &self.uploads {
            // Replaces any export the worker has not picked up yet.
            uploads.send_replace(Some(body.clone()));
        }

        Ok(body)
    }
}

pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// Uploads one export at a time, always the newest, so the remote copy
/// never goes back to an older calendar.
async fn run_uploads(client: Client, url: String, mut rx: watch::Receiver<Option<String>>) {
    while rx.changed().await.is_ok() {
        let Some(body) = rx.borrow_and_update().clone() else {
            continue;
        };
        match upload(&client, &url, body).await {
            Ok(()) => info!(%url, "calendar uploaded"),
            Err(err) => error!(%url, "calendar upload failed: {err}"),
        }
    }
}

pub async fn upload(client: &Client, url: &str, body: String) -> Result<(), reqwest::Error> {
    client
        .put(url)
        .header(CONTENT_TYPE, CALENDAR_CONTENT_TYPE)
        .body(body)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HabitId, HabitKind};
    use axum::{extract::State, routing::put, Router};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    type Received = Arc<Mutex<Option<(String, String)>>>;
    type Bodies = Arc<Mutex<Vec<String>>>;

    async fn serve(app: Router) -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn sample() -> Vec<Occurrence> {
        vec![Occurrence {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            habit_id: HabitId::new(),
            name: "Exercise".to_string(),
            kind: HabitKind::Boolean,
            value: Some(1),
        }]
    }

    #[tokio::test]
    async fn publish_writes_calendar_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/habit_calendar.ics");
        let publisher = CalendarPublisher::new(path.clone(), None, Duration::from_secs(1)).unwrap();

        let body = publisher.publish(&sample()).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, body);
        assert!(written.contains("SUMMARY:Exercise"));
    }

    #[tokio::test]
    async fn upload_puts_calendar_body() {
        let received: Received = Arc::new(Mutex::new(None));
        let app = Router::new()
            .route(
                "/calendar",
                put(
                    |State(slot): State<Received>,
                     headers: axum::http::HeaderMap,
                     body: String| async move {
                        let content_type = headers
                            .get(CONTENT_TYPE)
                            .and_then(|value| value.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        *slot.lock().await = Some((content_type, body));
                    },
                ),
            )
            .with_state(Arc::clone(&received));
        let addr = serve(app).await;

        let body = render_calendar(&sample(), Utc::now());
        upload(&Client::new(), &format!("http://{addr}/calendar"), body.clone())
            .await
            .unwrap();

        let (content_type, uploaded) = received.lock().await.clone().unwrap();
        assert_eq!(content_type, CALENDAR_CONTENT_TYPE);
        assert_eq!(uploaded, body);
    }

    #[tokio::test]
    async fn upload_reports_http_errors() {
        let addr = serve(Router::new()).await;

        let result = upload(&Client::new(), &format!("http://{addr}/missing"), String::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn upload_gives_up_on_a_silent_remote() {
        let app = Router::new().route(
            "/calendar",
            put(|| async { std::future::pending::<()>().await }),
        );
        let addr = serve(app).await;

        let client = build_client(Duration::from_millis(200)).unwrap();
        let err = upload(&client, &format!("http://{addr}/calendar"), String::new())
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn remote_ends_with_the_newest_export() {
        let bodies: Bodies = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/calendar",
                put(|State(bodies): State<Bodies>, body: String| async move {
                    bodies.lock().await.push(body);
                }),
            )
            .with_state(Arc::clone(&bodies));
        let addr = serve(app).await;

        let dir = tempfile::tempdir().unwrap();
        let publisher = CalendarPublisher::new(
            dir.path().join("habit_calendar.ics"),
            Some(format!("http://{addr}/calendar")),
            Duration::from_secs(2),
        )
        .unwrap();

        let mut later = sample();
        later[0].name = "Stretch".to_string();
        publisher.publish(&sample()).await.unwrap();
        let newest = publisher.publish(&later).await.unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
        loop {
            if bodies.lock().await.last() == Some(&newest) {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "newest export never arrived");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        let bodies = bodies.lock().await;
        assert_eq!(bodies.last(), Some(&newest));
        assert!(bodies.len() <= 2);
    }
}
