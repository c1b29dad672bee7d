//! Client-side state manager: refresh, submit, photo upload and the periodic
//! refresh tasks, all sharing one `ClientState`.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::ClientConfig;
use crate::errors::AppError;
use crate::mapper::format_timestamp;
use crate::models::{
    Action, GalleryImage, GalleryListing, Rsvp, RsvpForm, RsvpList, UploadResult, WriteResult,
};

use super::sample::{sample_gallery, sample_rsvps};
use super::state::{ClientState, SnapshotSource};
use super::transport::{ActionRequest, Transport};
use super::upload::{upload_body, upload_filename, validate_photo, PhotoFile, UploadContext};
use super::view::Filter;

/// Latest sync state, for whatever renders a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Refreshing,
    Live { count: usize },
    SampleData { reason: String },
    Saved { name: String },
    WriteFailed { message: String },
}

/// What a refresh installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Remote { count: usize },
    Sample { reason: String },
}

/// What happened to a submitted record.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Saved { result: WriteResult, is_update: bool },
    /// The backend could not be reached; the record is held locally as pending
    StoredLocally { temp_id: String, error: String },
}

/// Result of a form submission with an optional photo.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub record: SubmitOutcome,
    /// `None` when no photo was attached
    pub photo: Option<Result<String, AppError>>,
}

#[derive(Clone)]
pub struct StateManager {
    transport: Transport,
    config: Arc<ClientConfig>,
    state: Arc<RwLock<ClientState>>,
    status: Arc<watch::Sender<SyncStatus>>,
}

impl StateManager {
    pub fn new(transport: Transport, config: ClientConfig) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            transport,
            config: Arc::new(config),
            state: Arc::new(RwLock::new(ClientState::new())),
            status: Arc::new(status),
        }
    }

    /// Probe the backend to pick a transport, then build the manager.
    pub async fn connect(config: ClientConfig) -> Self {
        let transport = Transport::detect(&config).await;
        tracing::info!(
            "Using {} transport for {}",
            transport.kind(),
            config.backend_url
        );
        Self::new(transport, config)
    }

    /// Load records and gallery once, then keep both fresh in the background.
    pub async fn start(&self) -> PeriodicRefresh {
        self.refresh().await;
        self.refresh_gallery().await;
        self.spawn_periodic_refresh()
    }

    /// Another handle on the same state, talking through `transport`.
    pub fn with_transport(&self, transport: Transport) -> Self {
        Self {
            transport,
            ..self.clone()
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub async fn snapshot(&self) -> ClientState {
        self.state.read().await.clone()
    }

    pub async fn filter(&self, filter: Filter) -> Vec<Rsvp> {
        self.state.read().await.view(filter)
    }

    pub async fn gallery(&self) -> Vec<GalleryImage> {
        self.state.read().await.gallery().to_vec()
    }

    /// Names already on the list, for the "update my RSVP" picker.
    pub async fn guest_names(&self) -> Vec<String> {
        self.state.read().await.guest_names()
    }

    /// The form prefilled from this guest's current record.
    pub async fn form_for(&self, name: &str) -> Option<RsvpForm> {
        self.state
            .read()
            .await
            .find_by_name(name)
            .map(|tracked| RsvpForm::from_rsvp(&tracked.rsvp))
    }

    /// Fetch all records and merge them in. Never fails: an unreachable or
    /// failing backend installs the sample guests instead.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.status.send_replace(SyncStatus::Refreshing);

        let request = ActionRequest::get(Action::GetRsvps);
        match self.transport.send::<RsvpList>(&request).await {
            Ok(list) => {
                let count = list.rsvps.len();
                self.state.write().await.apply_snapshot(
                    list.rsvps,
                    SnapshotSource::Remote {
                        last_modified: list.last_modified,
                    },
                );
                tracing::debug!("Loaded {} RSVPs", count);
                self.status.send_replace(SyncStatus::Live { count });
                RefreshOutcome::Remote { count }
            }
            Err(e) => {
                tracing::warn!("Failed to load RSVPs, showing sample data: {}", e);
                self.state
                    .write()
                    .await
                    .apply_snapshot(sample_rsvps(), SnapshotSource::Sample);
                let reason = e.message();
                self.status.send_replace(SyncStatus::SampleData {
                    reason: reason.clone(),
                });
                RefreshOutcome::Sample { reason }
            }
        }
    }

    /// Fetch the gallery listing, falling back to the sample images.
    pub async fn refresh_gallery(&self) -> RefreshOutcome {
        let request = ActionRequest::get(Action::GetGalleryImages);
        match self.transport.send::<GalleryListing>(&request).await {
            Ok(listing) => {
                let count = listing.images.len();
                self.state.write().await.set_gallery(listing.images);
                tracing::debug!("Loaded {} gallery images", count);
                RefreshOutcome::Remote { count }
            }
            Err(e) => {
                tracing::warn!("Failed to load gallery, showing samples: {}", e);
                self.state.write().await.set_gallery(sample_gallery());
                RefreshOutcome::Sample {
                    reason: e.message(),
                }
            }
        }
    }

    /// Send one guest's RSVP.
    ///
    /// Validation and backend rejections are returned as errors. A transport
    /// failure is not: the record is kept locally as pending and the outcome
    /// carries the message.
    pub async fn submit(&self, mut record: Rsvp) -> Result<SubmitOutcome, AppError> {
        validate_record(&record)?;
        record.name = record.name.trim().to_string();
        record.timestamp = format_timestamp(Utc::now());

        let is_update = self
            .state
            .read()
            .await
            .find_by_name(&record.name)
            .is_some_and(|existing| !existing.is_pending() && existing.rsvp.row_index.is_some());

        let request = ActionRequest::get(Action::AddRsvp)
            .with_params(record.to_params())
            .with_params(vec![("isUpdate", is_update.to_string())]);

        match self.transport.send::<WriteResult>(&request).await {
            Ok(result) => {
                tracing::info!(
                    "RSVP for {} {:?} at row {}",
                    record.name,
                    result.action,
                    result.row_index
                );
                self.refresh().await;
                self.status.send_replace(SyncStatus::Saved {
                    name: record.name.clone(),
                });
                Ok(SubmitOutcome::Saved { result, is_update })
            }
            Err(AppError::Transport(message)) => {
                tracing::warn!("Could not save RSVP for {}: {}", record.name, message);
                let temp_id = self.state.write().await.apply_local(record, Utc::now());
                self.status.send_replace(SyncStatus::WriteFailed {
                    message: message.clone(),
                });
                Ok(SubmitOutcome::StoredLocally {
                    temp_id,
                    error: message,
                })
            }
            Err(e) => {
                self.status.send_replace(SyncStatus::WriteFailed {
                    message: e.message(),
                });
                Err(e)
            }
        }
    }

    /// Upload the photo (if any) and then send the record. A failed photo
    /// upload is reported alongside the record outcome and does not stop it.
    pub async fn submit_with_photo(
        &self,
        record: Rsvp,
        photo: Option<PhotoFile>,
    ) -> Result<SubmissionReport, AppError> {
        validate_record(&record)?;

        let photo = match photo {
            Some(photo) => {
                let context = UploadContext::Guest(record.name.trim().to_string());
                let uploaded = self.upload_photo(photo, context).await;
                if let Err(e) = &uploaded {
                    tracing::warn!("Photo upload failed for {}: {}", record.name, e);
                }
                Some(uploaded)
            }
            None => None,
        };

        let record = self.submit(record).await?;
        Ok(SubmissionReport { record, photo })
    }

    /// Send a photo and return its public URL.
    ///
    /// Size and type are checked before anything is sent; once the request
    /// is out, every failure is an `Upload` error.
    pub async fn upload_photo(
        &self,
        photo: PhotoFile,
        context: UploadContext,
    ) -> Result<String, AppError> {
        validate_photo(&photo, self.config.max_upload_bytes)?;

        let filename = upload_filename(&photo, &context, Utc::now().timestamp_millis());
        let request = ActionRequest::post(Action::UploadPhoto, upload_body(&photo, filename));

        let result = match self.transport.send::<UploadResult>(&request).await {
            Ok(result) if result.success => result,
            Ok(_) => return Err(AppError::Upload("Upload failed".to_string())),
            Err(e) => return Err(AppError::Upload(e.message())),
        };
        tracing::info!("Uploaded {} as {}", result.filename, result.file_id);

        if context == UploadContext::Gallery {
            self.refresh_gallery().await;
        }
        Ok(result.drive_url)
    }

    /// Re-fetch records and gallery on their own fixed intervals.
    pub fn spawn_periodic_refresh(&self) -> PeriodicRefresh {
        let rsvps = {
            let manager = self.clone();
            let period = self.config.refresh_interval;
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    manager.refresh().await;
                }
            })
        };

        let gallery = {
            let manager = self.clone();
            let period = self.config.gallery_refresh_interval;
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    manager.refresh_gallery().await;
                }
            })
        };

        PeriodicRefresh { rsvps, gallery }
    }
}

fn validate_record(record: &Rsvp) -> Result<(), AppError> {
    if record.name.trim().is_empty() {
        return Err(AppError::Validation("Please enter your name".to_string()));
    }
    if record.attendance.trim().is_empty() {
        return Err(AppError::Validation(
            "Please choose whether you are coming".to_string(),
        ));
    }
    Ok(())
}

/// Handles of the background refresh tasks. Dropping it stops them.
pub struct PeriodicRefresh {
    rsvps: JoinHandle<()>,
    gallery: JoinHandle<()>,
}

impl PeriodicRefresh {
    pub fn abort(&self) {
        self.rsvps.abort();
        self.gallery.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.rsvps.is_finished() && self.gallery.is_finished()
    }
}

impl Drop for PeriodicRefresh {
    fn drop(&mut self) {
        self.abort();
    }
}
