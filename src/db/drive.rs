//! Photo folder storage.
//!
//! Files live in one folder; only files marked public can be downloaded.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::mapper::format_timestamp;
use crate::models::{is_image_mime, GalleryImage, GalleryListing, UploadResult};

/// A stored file's bytes and metadata.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// File store scoped to the gallery folder.
pub struct DriveStore {
    pool: SqlitePool,
    folder_id: String,
    public_url: String,
}

impl DriveStore {
    pub fn new(pool: SqlitePool, folder_id: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            pool,
            folder_id: folder_id.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn drive_url(&self, file_id: &str) -> String {
        format!("{}/files/{}/view", self.public_url, file_id)
    }

    pub fn direct_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.public_url, file_id)
    }

    pub fn thumbnail_url(&self, file_id: &str) -> String {
        format!("{}/files/{}/thumbnail?sz=w400", self.public_url, file_id)
    }

    pub fn folder_url(&self) -> String {
        format!("{}/exec?action=getGalleryImages", self.public_url)
    }

    /// Write a new file into the folder and make it publicly readable.
    pub async fn store_image(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
    ) -> Result<UploadResult, AppError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let now = format_timestamp(Utc::now());

        sqlx::query(
            "INSERT INTO drive_files (id, folder_id, name, mime_type, size, data, public, last_modified) VALUES (?, ?, ?, ?, ?, ?, 0, ?)"
        )
        .bind(&id)
        .bind(&self.folder_id)
        .bind(filename)
        .bind(mime_type)
        .bind(bytes.len() as i64)
        .bind(bytes)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.set_public(&id).await?;

        tracing::info!("Stored {} ({} bytes) as {}", filename, bytes.len(), id);

        Ok(UploadResult {
            success: true,
            drive_url: self.drive_url(&id),
            direct_url: self.direct_url(&id),
            thumbnail_url: self.thumbnail_url(&id),
            filename: filename.to_string(),
            file_id: id,
        })
    }

    /// Mark a file as readable by anyone with the link.
    pub async fn set_public(&self, file_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE drive_files SET public = 1 WHERE id = ?")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("File {} not found", file_id)));
        }
        Ok(())
    }

    /// Image files in the folder, newest first.
    pub async fn list_gallery_images(&self) -> Result<GalleryListing, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, mime_type, size, last_modified FROM drive_files WHERE folder_id = ? ORDER BY last_modified DESC, rowid DESC"
        )
        .bind(&self.folder_id)
        .fetch_all(&self.pool)
        .await?;

        let images: Vec<GalleryImage> = rows
            .iter()
            .filter(|row| is_image_mime(row.get::<&str, _>("mime_type")))
            .map(|row| {
                let id: String = row.get("id");
                GalleryImage {
                    drive_url: self.drive_url(&id),
                    direct_url: self.direct_url(&id),
                    thumbnail_url: self.thumbnail_url(&id),
                    name: row.get("name"),
                    mime_type: row.get("mime_type"),
                    size: row.get("size"),
                    last_modified: row.get("last_modified"),
                    id,
                }
            })
            .collect();

        tracing::debug!("Found {} images in gallery folder", images.len());

        Ok(GalleryListing {
            count: images.len(),
            images,
            folder_url: self.folder_url(),
        })
    }

    /// Fetch a public file's contents; private or unknown files are `None`.
    pub async fn get_public_file(&self, file_id: &str) -> Result<Option<StoredFile>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, mime_type, data FROM drive_files WHERE id = ? AND public = 1",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StoredFile {
            id: row.get("id"),
            name: row.get("name"),
            mime_type: row.get("mime_type"),
            data: row.get("data"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn store() -> (DriveStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("drive.sqlite"))
            .await
            .unwrap();
        (
            DriveStore::new(pool, "gallery", "http://photos.test/"),
            temp_dir,
        )
    }

    #[tokio::test]
    async fn test_listing_skips_non_images() {
        let (store, _dir) = store().await;
        store
            .store_image(b"\x89PNG", "pumpkin.png", "image/png")
            .await
            .unwrap();
        store
            .store_image(b"hello", "notes.txt", "text/plain")
            .await
            .unwrap();

        let listing = store.list_gallery_images().await.unwrap();
        assert_eq!(listing.count, 1);
        assert_eq!(listing.images.len(), 1);
        assert_eq!(listing.images[0].name, "pumpkin.png");
        assert_eq!(listing.images[0].size, 4);
        assert_eq!(
            listing.folder_url,
            "http://photos.test/exec?action=getGalleryImages"
        );
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let (store, _dir) = store().await;
        store.store_image(b"1", "first.jpg", "image/jpeg").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.store_image(b"2", "second.jpg", "image/jpeg").await.unwrap();

        let listing = store.list_gallery_images().await.unwrap();
        let names: Vec<&str> = listing.images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["second.jpg", "first.jpg"]);
    }

    #[tokio::test]
    async fn test_stored_file_urls_and_contents() {
        let (store, _dir) = store().await;
        let result = store
            .store_image(b"jpegbytes", "party.jpg", "image/jpeg")
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(
            result.direct_url,
            format!("http://photos.test/files/{}", result.file_id)
        );
        assert_eq!(
            result.drive_url,
            format!("http://photos.test/files/{}/view", result.file_id)
        );

        let file = store.get_public_file(&result.file_id).await.unwrap().unwrap();
        assert_eq!(file.data, b"jpegbytes");
        assert_eq!(file.mime_type, "image/jpeg");
        assert!(store.get_public_file("missing").await.unwrap().is_none());
    }
}
