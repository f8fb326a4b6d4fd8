use crate::config::ServerConfig;
use crate::notes::NOTES;
use async_trait::async_trait;
use navigable_command::{
    App, AxumRouter, Command, CommandError, Params, RegistrationError, Response, Route,
};
use serde::Deserialize;
use serde_json::json;

/// 注册全部命令
pub fn app(config: &ServerConfig) -> Result<App<AxumRouter>, RegistrationError> {
    App::new(AxumRouter::new("demo").with_body_limit(config.body_limit))
        .command::<Health>()?
        .command::<ListNotes>()?
        .command::<ShowNote>()?
        .command::<CreateNote>()?
        .command::<UpdateNote>()
}

fn not_found(command: &impl Command, id: &str) -> Response {
    command.render([
        ("status", json!(404)),
        ("json", json!({ "error": format!("note {id} not found") })),
    ])
}

/// 序列化失败报告为命令失败（500）
fn note_json<T: serde::Serialize>(
    command: &'static str,
    note: &T,
) -> Result<serde_json::Value, CommandError> {
    serde_json::to_value(note).map_err(|err| CommandError::failed(command, err.to_string()))
}

pub struct Health {
    params: Params,
}

#[async_trait]
impl Command for Health {
    const NAME: &'static str = "Health";
    const ROUTE: Route = Route::get("/health");

    fn new(params: Params) -> Self {
        Self { params }
    }

    fn params(&self) -> &Params {
        &self.params
    }

    async fn execute(&self) -> Result<Response, CommandError> {
        Ok(self.render([("text", "ok")]))
    }
}

pub struct ListNotes {
    params: Params,
}

#[async_trait]
impl Command for ListNotes {
    const NAME: &'static str = "ListNotes";
    const ROUTE: Route = Route::get("/notes");

    fn new(params: Params) -> Self {
        Self { params }
    }

    fn params(&self) -> &Params {
        &self.params
    }

    async fn execute(&self) -> Result<Response, CommandError> {
        let notes = NOTES.list(self.params.get_str("search"));
        Ok(self.render([("json", note_json(Self::NAME, &notes)?)]))
    }
}

pub struct ShowNote {
    params: Params,
}

#[async_trait]
impl Command for ShowNote {
    const NAME: &'static str = "ShowNote";
    const ROUTE: Route = Route::get("/notes/:id");

    fn new(params: Params) -> Self {
        Self { params }
    }

    fn params(&self) -> &Params {
        &self.params
    }

    async fn execute(&self) -> Result<Response, CommandError> {
        let id = self.params.get_str("id").unwrap_or_default();
        match NOTES.get(id) {
            Some(note) => Ok(self.render([("json", note_json(Self::NAME, &note)?)])),
            None => Ok(not_found(self, id)),
        }
    }
}

#[derive(Deserialize)]
struct NewNote {
    title: String,
    #[serde(default)]
    body: String,
}

pub struct CreateNote {
    params: Params,
}

#[async_trait]
impl Command for CreateNote {
    const NAME: &'static str = "CreateNote";
    const ROUTE: Route = Route::post("/notes");

    fn new(params: Params) -> Self {
        Self { params }
    }

    fn params(&self) -> &Params {
        &self.params
    }

    async fn execute(&self) -> Result<Response, CommandError> {
        let NewNote { title, body } = self.params.parse()?;
        if title.trim().is_empty() {
            return Ok(self.render([
                ("status", json!(422)),
                ("json", json!({ "error": "title must not be empty" })),
            ]));
        }

        let note = NOTES.create(title, body);
        tracing::info!(id = %note.id, "note created");
        Ok(self.render([
            ("status", json!(201)),
            ("headers", json!({ "location": format!("/notes/{}", note.id) })),
            ("json", note_json(Self::NAME, &note)?),
        ]))
    }
}

#[derive(Deserialize)]
struct NoteChanges {
    id: String,
    title: Option<String>,
    body: Option<String>,
}

pub struct UpdateNote {
    params: Params,
}

#[async_trait]
impl Command for UpdateNote {
    const NAME: &'static str = "UpdateNote";
    const ROUTE: Route = Route::patch("/notes/:id");

    fn new(params: Params) -> Self {
        Self { params }
    }

    fn params(&self) -> &Params {
        &self.params
    }

    async fn execute(&self) -> Result<Response, CommandError> {
        let NoteChanges { id, title, body } = self.params.parse()?;
        match NOTES.update(&id, title, body) {
            Some(note) => Ok(self.render([("json", note_json(Self::NAME, &note)?)])),
            None => Ok(not_found(self, &id)),
        }
    }
}
