//! Landing page

use axum::response::Html;

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Home</title>
</head>
<body>
  <h1>Home</h1>
  <p>User service is running.</p>
  <p><a href="/users">Browse users</a></p>
</body>
</html>
"#;

/// GET /
pub async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}
