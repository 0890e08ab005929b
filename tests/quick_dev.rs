use anyhow::Result;
use serde_json::json;

// Needs a running server: `cargo test -- --ignored`
#[tokio::test]
#[ignore]
async fn quick_dev() -> Result<()> {
    let hc = httpc_test::new_client("http://localhost:8080/api")?;

    hc.do_post(
        "/boards",
        json!({
          "title": "Welcome",
          "content": "First post on the board",
          "author": "admin",
        }),
    )
    .await?
    .print()
    .await?;

    hc.do_get("/boards?page=0&size=5&sort=id&direction=desc")
        .await?
        .print()
        .await?;

    hc.do_get("/boards?searchKeyword=Welcome&searchType=title")
        .await?
        .print()
        .await?;

    hc.do_get("/boards/1").await?.print().await?;

    hc.do_put(
        "/boards/1",
        json!({
          "title": "Welcome (edited)",
          "content": "First post on the board",
          "author": "admin",
        }),
    )
    .await?
    .print()
    .await?;

    hc.do_get("/boards/popular").await?.print().await?;

    // hc.do_delete("/boards/1").await?.print().await?;

    Ok(())
}
