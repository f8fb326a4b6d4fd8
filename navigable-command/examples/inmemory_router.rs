use async_trait::async_trait;
use http::Method;
use navigable_command::{
    App, Command, CommandError, InMemoryRouter, Params, RequestContext, Response, Route,
};
use serde_json::json;

struct ShowUser {
    params: Params,
}

#[async_trait]
impl Command for ShowUser {
    const NAME: &'static str = "ShowUser";
    const ROUTE: Route = Route::get("/users/:id");

    fn new(params: Params) -> Self {
        Self { params }
    }

    fn params(&self) -> &Params {
        &self.params
    }

    async fn execute(&self) -> Result<Response, CommandError> {
        let id = self.params.get_str("id").unwrap_or_default();
        Ok(self.render([("json", json!({ "id": id, "name": "Alice" }))]))
    }
}

// 未实现 execute 的命令：分发时返回 NotImplemented
struct DeleteUser {
    params: Params,
}

impl Command for DeleteUser {
    const NAME: &'static str = "DeleteUser";
    const ROUTE: Route = Route::delete("/users/:id");

    fn new(params: Params) -> Self {
        Self { params }
    }

    fn params(&self) -> &Params {
        &self.params
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let router = App::new(InMemoryRouter::default())
        .command::<ShowUser>()?
        .command::<DeleteUser>()?
        .into_router();

    let ctx = RequestContext::builder()
        .path("/users/42")
        .query("verbose=true")
        .build();
    let response = router.call(ctx).await?;
    println!(
        "ShowUser: status={} body={}",
        response.status(),
        String::from_utf8_lossy(response.body())
    );

    let ctx = RequestContext::builder()
        .method(Method::DELETE)
        .path("/users/42")
        .build();
    if let Err(err @ CommandError::NotImplemented { .. }) = router.call(ctx).await {
        eprintln!("DeleteUser failed as expected: {err}");
    }
    Ok(())
}
