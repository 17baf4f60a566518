// HTTP handler bindings for the game host
//
// This module provides thin wrapper functions that bind Rocket HTTP routes
// to the Bot's core logic methods. Handlers are responsible for:
// - Deserializing incoming JSON requests
// - Rejecting snapshots whose pawns are off the board
// - Delegating to Bot methods
// - Serializing responses

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, routes, Build, Rocket, Route};
use serde_json::{json, Value};

use crate::bot::Bot;
use crate::types::TurnRequest;

/// GET / endpoint
/// Returns bot metadata
#[get("/")]
pub fn index(bot: &rocket::State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /start endpoint
/// Called when a game starts
#[post("/start", format = "json", data = "<start_req>")]
pub fn start(bot: &rocket::State<Bot>, start_req: Json<TurnRequest>) -> Status {
    bot.start(&start_req);

    Status::Ok
}

/// POST /move endpoint
/// Called each turn to compute and return the next move and wall
#[post("/move", format = "json", data = "<move_req>")]
pub async fn get_move(
    bot: &rocket::State<Bot>,
    move_req: Json<TurnRequest>,
) -> Result<Json<Value>, (Status, Json<Value>)> {
    if let Err(e) = move_req.validate() {
        return Err((
            Status::UnprocessableEntity,
            Json(json!({ "error": e.to_string() })),
        ));
    }

    let response = bot.get_move(&move_req).await;

    Ok(Json(response))
}

/// POST /end endpoint
/// Called when a game ends
#[post("/end", format = "json", data = "<end_req>")]
pub fn end(bot: &rocket::State<Bot>, end_req: Json<TurnRequest>) -> Status {
    bot.end(&end_req);

    Status::Ok
}

pub fn routes() -> Vec<Route> {
    routes![index, start, get_move, end]
}

/// Assembles the server around a ready bot
pub fn build_rocket(bot: Bot) -> Rocket<Build> {
    rocket::build().manage(bot).mount("/", routes())
}
