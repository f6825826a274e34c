//! Streaming receiver for the profile form.
//!
//! Reads the multipart body field by field, applying the [`UploadPolicy`]
//! before and while bytes arrive. Nothing is written to disk here; the caller
//! hands the accepted photo to the photo store.

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;
use tracing::debug;

use crate::domain::{IncomingPhoto, UploadPolicy, UploadRejection};

/// Text field updating the visitor's first name.
pub const FIRST_NAME_FIELD: &str = "firstName";

/// Largest accepted text field value, in bytes.
pub const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Fields of the profile form that survived validation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfilePhotoForm {
    pub first_name: Option<String>,
    pub photo: Option<IncomingPhoto>,
}

/// Consume `payload` and collect the profile form.
///
/// At most one file is accepted, and only under the policy's field name. A
/// file part with an empty file name is a form submitted without choosing a
/// file and is skipped. Unknown text fields are ignored.
pub async fn read_profile_form(
    mut payload: Multipart,
    policy: &UploadPolicy,
) -> Result<ProfilePhotoForm, UploadRejection> {
    let mut form = ProfilePhotoForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);

        match file_name {
            Some(file_name) => {
                if name != policy.field_name {
                    return Err(UploadRejection::UnexpectedField { field: name });
                }
                if file_name.is_empty() {
                    debug!("empty file part skipped");
                    continue;
                }
                if form.photo.is_some() {
                    return Err(UploadRejection::TooManyFiles);
                }
                let content_type = field.content_type().map(|mime| mime.essence_str().to_owned());
                let extension = policy.check_type(&file_name, content_type.as_deref())?;
                let bytes = read_limited(&mut field, policy.max_bytes).await?;
                debug!(file_name = %file_name, size = bytes.len(), "photo received");
                form.photo = Some(IncomingPhoto {
                    original_name: file_name,
                    extension,
                    bytes,
                });
            }
            None if name == FIRST_NAME_FIELD => {
                let bytes = read_limited(&mut field, MAX_TEXT_FIELD_BYTES).await?;
                let value = String::from_utf8(bytes)
                    .map_err(|_| UploadRejection::Malformed(format!("{name} is not UTF-8")))?;
                form.first_name = Some(value);
            }
            None => debug!(field = %name, "ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// Read a field to the end, failing as soon as more than `limit` bytes arrive.
async fn read_limited(field: &mut Field, limit: usize) -> Result<Vec<u8>, UploadRejection> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        let received = buf.len() + chunk.len();
        if received > limit {
            return Err(UploadRejection::TooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn malformed(err: actix_multipart::MultipartError) -> UploadRejection {
    UploadRejection::Malformed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MultipartBody;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;
    use serde_json::{Value, json};

    /// Run the receiver behind a tiny app and report the outcome as JSON.
    async fn submit(body: MultipartBody, policy: UploadPolicy) -> Value {
        let app = test::init_service(App::new().app_data(web::Data::new(policy)).route(
            "/upload",
            web::post().to(
                |payload: Multipart, policy: web::Data<UploadPolicy>| async move {
                    let outcome = match read_profile_form(payload, &policy).await {
                        Ok(form) => json!({
                            "firstName": form.first_name,
                            "photo": form.photo.map(|p| json!({
                                "name": p.original_name,
                                "extension": p.extension,
                                "size": p.bytes.len(),
                            })),
                        }),
                        Err(rejection) => json!({ "rejected": rejection.flash_message() }),
                    };
                    HttpResponse::Ok().json(outcome)
                },
            ),
        ))
        .await;
        let (content_type, payload) = body.finish();
        let req = test::TestRequest::post()
            .uri("/upload")
            .insert_header(("content-type", content_type))
            .set_payload(payload)
            .to_request();
        test::call_and_read_body_json(&app, req).await
    }

    #[rstest]
    #[actix_web::test]
    async fn accepts_a_png_and_first_name() {
        let body = MultipartBody::new()
            .text("firstName", "Ada")
            .file("profilePhoto", "me.png", "image/png", &[0x89, b'P', b'N', b'G']);
        let outcome = submit(body, UploadPolicy::default()).await;
        assert_eq!(
            outcome,
            json!({
                "firstName": "Ada",
                "photo": { "name": "me.png", "extension": ".png", "size": 4 },
            })
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn empty_file_part_means_no_photo() {
        let body = MultipartBody::new().file("profilePhoto", "", "application/octet-stream", b"");
        let outcome = submit(body, UploadPolicy::default()).await;
        assert_eq!(outcome["photo"], Value::Null);
        assert_eq!(outcome.get("rejected"), None);
    }

    #[rstest]
    #[case::executable(
        MultipartBody::new().file("profilePhoto", "setup.exe", "application/octet-stream", b"MZ"),
        "Only images are allowed"
    )]
    #[case::wrong_field(
        MultipartBody::new().file("avatar", "me.png", "image/png", b"png"),
        "Error uploading file: Unexpected field"
    )]
    #[case::two_files(
        MultipartBody::new()
            .file("profilePhoto", "a.png", "image/png", b"a")
            .file("profilePhoto", "b.png", "image/png", b"b"),
        "Error uploading file: Too many files"
    )]
    #[actix_web::test]
    async fn rejects_invalid_forms(#[case] body: MultipartBody, #[case] message: &str) {
        let outcome = submit(body, UploadPolicy::default()).await;
        assert_eq!(outcome["rejected"], json!(message));
    }

    #[rstest]
    #[actix_web::test]
    async fn stops_reading_past_the_size_limit() {
        let policy = UploadPolicy {
            max_bytes: 8,
            ..UploadPolicy::default()
        };
        let body = MultipartBody::new().file("profilePhoto", "big.gif", "image/gif", &[0u8; 9]);
        let outcome = submit(body, policy).await;
        assert_eq!(outcome["rejected"], json!("Error uploading file: File too large"));
    }

    #[rstest]
    #[actix_web::test]
    async fn file_exactly_at_the_limit_is_accepted() {
        let policy = UploadPolicy {
            max_bytes: 8,
            ..UploadPolicy::default()
        };
        let body = MultipartBody::new().file("profilePhoto", "ok.jpg", "image/jpeg", &[1u8; 8]);
        let outcome = submit(body, policy).await;
        assert_eq!(outcome["photo"]["size"], json!(8));
    }
}
