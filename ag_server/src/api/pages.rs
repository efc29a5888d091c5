//! HTML pages served by the gate.
//!
//! Every page is a self-contained document. Values coming from the request
//! (the session token echoed into links and forms) are escaped.

/// Minimal HTML escaping for text and attribute values
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `?session=<token>` suffix, empty without a token
pub fn session_query(token: Option<&str>) -> String {
    token
        .map(|t| format!("?session={}", html_escape(t)))
        .unwrap_or_default()
}

/// Password prompt
pub fn render_login_page(token: Option<&str>, first_run: bool, error: Option<&str>) -> String {
    let error_html = error
        .map(|e| format!(r#"<div class="error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();
    let first_run_html = if first_run {
        r#"<p class="hint">처음 접속입니다. 관리자에게 받은 초기 비밀번호를 입력하세요.<br>First visit: use the initial password from the administrator.</p>"#
    } else {
        ""
    };
    let action = format!("/login{}", session_query(token));

    format!(
        r#"<!DOCTYPE html>
<html lang="ko"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>출석부 - 로그인</title>
<style>{style}</style>
</head><body>
<div class="card">
  <h1>출석부</h1>
  {first_run_html}
  {error_html}
  <form method="POST" action="{action}">
    <label>비밀번호 / Password</label>
    <input type="password" name="password" required autofocus autocomplete="current-password">
    <button type="submit">로그인 / Login</button>
  </form>
</div>
</body></html>"#,
        style = base_style(),
    )
}

/// Forced password change after a first-run login
pub fn render_change_password_page(token: Option<&str>, message: Option<&str>) -> String {
    let message_html = message
        .map(|m| format!(r#"<div class="error">{}</div>"#, html_escape(m)))
        .unwrap_or_default();
    let action = format!("/change-password{}", session_query(token));

    format!(
        r#"<!DOCTYPE html>
<html lang="ko"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>출석부 - 비밀번호 변경</title>
<style>{style}</style>
</head><body>
<div class="card">
  <h1>비밀번호 변경</h1>
  <p class="hint">초기 비밀번호로 로그인했습니다. 새 비밀번호를 설정해야 계속할 수 있습니다.<br>
  You logged in with the initial password. Set a new one to continue.</p>
  {message_html}
  <form method="POST" action="{action}">
    <label>새 비밀번호 / New password</label>
    <input type="password" name="new_password" required autocomplete="new-password">
    <label>새 비밀번호 확인 / Confirm</label>
    <input type="password" name="confirm_password" required autocomplete="new-password">
    <button type="submit">변경 / Change</button>
  </form>
</div>
</body></html>"#,
        style = base_style(),
    )
}

/// Landing page behind the gate
pub fn render_home_page(token: Option<&str>, bookmark_hint: bool) -> String {
    let hint_html = if bookmark_hint {
        r#"<div class="success">로그인되었습니다. 이 페이지를 북마크하면 다음부터 비밀번호 없이 들어올 수 있습니다.<br>
  Logged in. Bookmark this page to skip the password next time.</div>"#
    } else {
        ""
    };
    let home = format!("/{}", session_query(token));

    format!(
        r#"<!DOCTYPE html>
<html lang="ko"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>출석부</title>
<style>{style}</style>
</head><body>
<div class="card">
  <h1>출석부</h1>
  {hint_html}
  <p><a href="{home}">홈 / Home</a></p>
</div>
</body></html>"#,
        style = base_style(),
    )
}

/// Operator-facing error page for a blocked request
pub fn render_blocked_page(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>출석부 - 사용할 수 없음</title>
<style>{style}</style>
</head><body>
<div class="card">
  <h1>사용할 수 없음 / Unavailable</h1>
  <div class="error">{message}</div>
</div>
</body></html>"#,
        message = html_escape(message),
        style = base_style(),
    )
}

fn base_style() -> &'static str {
    r#"*{box-sizing:border-box;margin:0;padding:0}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;background:#f4f1ea;min-height:100vh;display:flex;align-items:center;justify-content:center;padding:20px}
.card{background:#fff;border-radius:12px;box-shadow:0 4px 16px rgba(0,0,0,.08);padding:32px;max-width:400px;width:100%}
h1{font-size:24px;margin-bottom:16px;color:#3b3024}
label{display:block;font-size:14px;margin:12px 0 6px;color:#555}
input{width:100%;padding:12px;border:1px solid #ccc;border-radius:8px;font-size:16px}
button{width:100%;margin-top:20px;padding:14px;border:0;border-radius:8px;background:#6b4f2c;color:#fff;font-size:16px;cursor:pointer}
.hint{font-size:13px;color:#777;margin-bottom:12px}
.error{background:#fdecea;color:#a12622;padding:10px 12px;border-radius:8px;font-size:14px;margin-bottom:12px}
.success{background:#e8f5e9;color:#256029;padding:10px 12px;border-radius:8px;font-size:14px;margin-bottom:12px}"#
}
