//! API route configuration.
//!
//! Routes that act for a user read the caller from the `X-User-Id` header
//! (see [`crate::api::extractors`]).

use crate::api::handlers::{
    activity, categories, comments, contacts, engagement, newsletter, snippets,
};
use crate::api::middleware::rate_limit::{self, ClientIpSource};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes.
///
/// `strict_limit` puts the stricter per-IP limiter on the anonymous write
/// endpoints (contact form, newsletter subscribe and unsubscribe); `None`
/// leaves them unlimited.
///
/// # Endpoints
///
/// - `GET|POST          /categories`
/// - `GET|PATCH|DELETE  /categories/{slug}`
/// - `GET               /categories/{slug}/snippets`
/// - `GET|POST          /snippets`
/// - `GET|PATCH|DELETE  /snippets/{slug}`
/// - `POST              /snippets/{slug}/views` (auth)
/// - `GET|POST|DELETE   /snippets/{slug}/reactions` (auth)
/// - `GET|POST          /snippets/{slug}/comments` (POST: auth)
/// - `GET|PATCH|DELETE  /comments/{id}` (PATCH, DELETE: auth, author only)
/// - `GET|POST          /snippets/{slug}/shares`
/// - `GET|POST          /snippets/{slug}/runs`
/// - `GET|POST          /history` (auth)
/// - `GET|PATCH|DELETE  /history/{id}` (auth)
/// - `GET|POST          /contacts` (POST: strict limit)
/// - `GET|PATCH|DELETE  /contacts/{id}`
/// - `GET               /newsletter/subscribers`
/// - `GET|PATCH|DELETE  /newsletter/subscribers/{id}`
/// - `POST              /newsletter/subscribe` (strict limit)
/// - `GET|POST          /newsletter/unsubscribe` (strict limit)
/// - `GET|DELETE        /newsletter/deleted`
/// - `GET|DELETE        /newsletter/deleted/{id}`
/// - `POST              /newsletter/deleted/reactivate`
pub fn api_routes(strict_limit: Option<ClientIpSource>) -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(categories::list_categories_handler).post(categories::create_category_handler),
        )
        .route(
            "/categories/{slug}",
            get(categories::get_category_handler)
                .patch(categories::update_category_handler)
                .delete(categories::delete_category_handler),
        )
        .route(
            "/categories/{slug}/snippets",
            get(categories::category_snippets_handler),
        )
        .route(
            "/snippets",
            get(snippets::list_snippets_handler).post(snippets::create_snippet_handler),
        )
        .route(
            "/snippets/{slug}",
            get(snippets::get_snippet_handler)
                .patch(snippets::update_snippet_handler)
                .delete(snippets::delete_snippet_handler),
        )
        .route(
            "/snippets/{slug}/views",
            post(engagement::record_view_handler),
        )
        .route(
            "/snippets/{slug}/reactions",
            get(engagement::get_reaction_handler)
                .post(engagement::set_reaction_handler)
                .delete(engagement::delete_reaction_handler),
        )
        .route(
            "/snippets/{slug}/comments",
            get(comments::list_comments_handler).post(comments::create_comment_handler),
        )
        .route(
            "/comments/{id}",
            get(comments::get_comment_handler)
                .patch(comments::update_comment_handler)
                .delete(comments::delete_comment_handler),
        )
        .route(
            "/snippets/{slug}/shares",
            get(activity::list_shares_handler).post(activity::create_share_handler),
        )
        .route(
            "/snippets/{slug}/runs",
            get(activity::list_runs_handler).post(activity::create_run_handler),
        )
        .route(
            "/history",
            get(engagement::list_history_handler).post(engagement::create_history_handler),
        )
        .route(
            "/history/{id}",
            get(engagement::get_history_handler)
                .patch(engagement::update_history_handler)
                .delete(engagement::delete_history_handler),
        )
        .route(
            "/contacts",
            get(contacts::list_contacts_handler).merge(rate_limit::strict(
                post(contacts::create_contact_handler),
                strict_limit,
            )),
        )
        .route(
            "/contacts/{id}",
            get(contacts::get_contact_handler)
                .patch(contacts::update_contact_handler)
                .delete(contacts::delete_contact_handler),
        )
        .route(
            "/newsletter/subscribe",
            rate_limit::strict(post(newsletter::subscribe_handler), strict_limit),
        )
        .route(
            "/newsletter/unsubscribe",
            rate_limit::strict(
                get(newsletter::unsubscribe_link_handler).post(newsletter::unsubscribe_handler),
                strict_limit,
            ),
        )
        .route(
            "/newsletter/subscribers",
            get(newsletter::list_subscribers_handler),
        )
        .route(
            "/newsletter/subscribers/{id}",
            get(newsletter::get_subscriber_handler)
                .patch(newsletter::update_subscriber_handler)
                .delete(newsletter::delete_subscriber_handler),
        )
        .route(
            "/newsletter/deleted",
            get(newsletter::list_deleted_handler).delete(newsletter::clear_deleted_handler),
        )
        .route(
            "/newsletter/deleted/{id}",
            get(newsletter::get_deleted_handler).delete(newsletter::delete_deleted_handler),
        )
        .route(
            "/newsletter/deleted/reactivate",
            post(newsletter::reactivate_handler),
        )
}
