use fire_router as router;

use router::error::ClientErrorKind;
use router::json::Json;
use router::routes::sync;
use router::{Error, Request};

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
	name: String,
	email: String,
}

#[derive(Debug, Serialize)]
struct Message {
	message: &'static str,
}

type Users = Arc<RwLock<HashMap<String, User>>>;

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_max_level(tracing::Level::INFO)
		.init();

	let users: Users = Arc::new(RwLock::new(HashMap::new()));

	let server = router::build("127.0.0.1:3000")
		.await
		.expect("address could not be parsed");

	let get_users = users.clone();
	let put_users = users;

	server
		.router()
		.get("/users/:id", move |_, matched| {
			let users = get_users.clone();
			async move {
				let id = matched.param("id").unwrap_or_default();
				let user = users.read().await.get(id).cloned();
				user.map(Json).ok_or(Error::from(ClientErrorKind::NotFound))
			}
		})
		.unwrap()
		.put("/users/:id", move |req: Request, matched| {
			let users = put_users.clone();
			async move {
				let user: User = req.into_body().deserialize().await?;
				let id = matched.param("id").unwrap_or_default().to_string();
				users.write().await.insert(id, user.clone());

				Ok::<_, Error>(Json(user))
			}
		})
		.unwrap()
		.all("*", sync(|_, _| {
			let mut resp = router::into::IntoResponse::into_response(Json(
				Message {
					message: "Not Found",
				},
			));
			*resp.status_mut() = router::header::StatusCode::NOT_FOUND;
			resp
		}))
		.unwrap();

	server.serve().await.unwrap();
}
