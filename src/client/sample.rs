//! Fixed data shown when the backend cannot be reached.

use crate::models::{GalleryImage, Rsvp};

fn sample(
    n: u32,
    name: &str,
    attendance: &str,
    need_pumpkin: &str,
    bringing: &str,
    pumpkin_patch: &str,
    patch_dates: &str,
) -> Rsvp {
    Rsvp {
        id: format!("sample-{}", n),
        row_index: None,
        name: name.to_string(),
        email: String::new(),
        attendance: attendance.to_string(),
        need_pumpkin: need_pumpkin.to_string(),
        bringing: bringing.to_string(),
        pumpkin_patch: pumpkin_patch.to_string(),
        patch_dates: patch_dates.to_string(),
        timestamp: String::new(),
    }
}

/// Five guests covering every attendance value.
pub fn sample_rsvps() -> Vec<Rsvp> {
    vec![
        sample(
            1,
            "Alex",
            "Yes",
            "No",
            "Pumpkin beer and my famous carving knife set!",
            "Yes",
            "Sat 10/25, Sun 10/26",
        ),
        sample(
            2,
            "Sam",
            "Maybe",
            "Yes",
            "Will bring pumpkin pie if I can make it",
            "No",
            "",
        ),
        sample(
            3,
            "Jordan",
            "Yes",
            "Maybe",
            "Carving tools and Halloween decorations",
            "Yes",
            "Mon 10/27, Wed 10/29",
        ),
        sample(4, "Taylor", "No", "", "Sorry, can't make it this year!", "No", ""),
        sample(5, "Casey", "", "", "", "", ""),
    ]
}

/// Two placeholder gallery images.
pub fn sample_gallery() -> Vec<GalleryImage> {
    [(1, "ff6b35"), (2, "f7931e")]
        .into_iter()
        .map(|(n, color)| {
            let url = format!(
                "https://via.placeholder.com/400x300/{}/ffffff?text=Sample+{}",
                color, n
            );
            GalleryImage {
                id: format!("sample{}", n),
                name: format!("Sample Pumpkin {}", n),
                drive_url: url.clone(),
                direct_url: url.clone(),
                thumbnail_url: url,
                mime_type: "image/png".to_string(),
                size: 0,
                last_modified: String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_shape() {
        let rsvps = sample_rsvps();
        assert_eq!(rsvps.len(), 5);
        assert!(rsvps.iter().all(|r| r.id.starts_with("sample-")));
        assert_eq!(rsvps.iter().filter(|r| r.is_unanswered()).count(), 1);
        assert_eq!(sample_gallery().len(), 2);
    }
}
