//! Post CRUD handlers.
//!
//! Create and update accept `multipart/form-data` with `title`, `subtitle`,
//! `content` text fields and an optional `image` file field. Field values
//! overwrite wholesale: an omitted subtitle clears the stored one.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use futures::TryStreamExt;
use uuid::Uuid;

use blog_core::domain::{Post, PostWithAuthor};
use blog_shared::dto::{AuthorResponse, MessageResponse, PostResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Decoded multipart form for create/update.
#[derive(Default)]
struct PostForm {
    title: Option<String>,
    subtitle: Option<String>,
    content: Option<String>,
    /// Raw bytes and MIME type of the uploaded file, if any.
    image: Option<(Vec<u8>, String)>,
}

/// Buffer the multipart payload into a [`PostForm`], enforcing the upload
/// size cap across all fields.
async fn read_form(mut payload: Multipart, max_bytes: usize) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();
    let mut total: usize = 0;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed multipart payload: {e}")))?
        {
            total += chunk.len();
            if total > max_bytes {
                return Err(AppError::PayloadTooLarge);
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "title" => form.title = Some(String::from_utf8_lossy(&data).into_owned()),
            "subtitle" => {
                let value = String::from_utf8_lossy(&data).into_owned();
                form.subtitle = (!value.trim().is_empty()).then_some(value);
            }
            "content" => form.content = Some(String::from_utf8_lossy(&data).into_owned()),
            "image" => {
                if !data.is_empty() {
                    form.image = Some((data, content_type));
                }
            }
            // Unknown fields are ignored
            _ => {}
        }
    }

    Ok(form)
}

fn to_response(post: Post, author: AuthorResponse) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        subtitle: post.subtitle,
        content: post.content,
        image_url: post.image_url,
        author,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn joined_response(joined: PostWithAuthor) -> PostResponse {
    let author = AuthorResponse {
        id: joined.author.id,
        username: joined.author.username,
    };
    to_response(joined.post, author)
}

fn parse_post_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Post not found".to_string()))
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.find_all_with_authors().await?;
    let body: Vec<PostResponse> = posts.into_iter().map(joined_response).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;

    let joined = state
        .posts
        .find_with_author(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(joined_response(joined)))
}

/// POST /api/posts - Protected route
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_form(payload, state.max_upload_bytes).await?;

    let title = form.title.unwrap_or_default();
    let content = form.content.unwrap_or_default();
    Post::validate_fields(&title, &content)?;

    // Store the attachment first; its URL lands on the new post. A failure
    // after this point leaves the attachment orphaned (accepted).
    let image_url = match form.image {
        Some((data, content_type)) => {
            Some(state.attachments.put(data, &content_type).await?.url())
        }
        None => None,
    };

    // Author comes from the verified principal, never from the request body
    let post = Post::new(identity.user.id, title, form.subtitle, content, image_url);
    let saved = state.posts.save(post).await?;

    tracing::info!(post_id = %saved.id, author = %identity.user.username, "Post created");

    let author = AuthorResponse {
        id: identity.user.id,
        username: identity.user.username,
    };
    Ok(HttpResponse::Created().json(to_response(saved, author)))
}

/// PUT /api/posts/{id} - Protected route
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;

    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if !post.is_owned_by(identity.user.id) {
        return Err(AppError::NotOwner);
    }

    let form = read_form(payload, state.max_upload_bytes).await?;

    let title = form.title.unwrap_or_default();
    let content = form.content.unwrap_or_default();
    Post::validate_fields(&title, &content)?;

    post.title = title;
    post.subtitle = form.subtitle;
    post.content = content;
    post.updated_at = Utc::now();

    // A new image replaces the reference; the old attachment stays behind
    // as an orphan
    if let Some((data, content_type)) = form.image {
        post.image_url = Some(state.attachments.put(data, &content_type).await?.url());
    }

    let saved = state.posts.save(post).await?;

    let author = AuthorResponse {
        id: identity.user.id,
        username: identity.user.username,
    };
    Ok(HttpResponse::Ok().json(to_response(saved, author)))
}

/// DELETE /api/posts/{id} - Protected route
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if !post.is_owned_by(identity.user.id) {
        return Err(AppError::NotOwner);
    }

    // Removes the post record only; its attachment is not deleted
    state.posts.delete(id).await?;

    tracing::info!(post_id = %id, author = %identity.user.username, "Post deleted");

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post removed".to_string(),
    }))
}
