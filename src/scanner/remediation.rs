//! Configuration snippets attached to failing findings

pub const HSTS: &str = r#"# nginx
add_header Strict-Transport-Security "max-age=31536000; includeSubDomains" always;

# Apache
Header always set Strict-Transport-Security "max-age=31536000; includeSubDomains""#;

pub const CSP: &str = r#"# nginx
add_header Content-Security-Policy "default-src 'self'; object-src 'none'; frame-ancestors 'self'" always;

# Apache
Header always set Content-Security-Policy "default-src 'self'; object-src 'none'; frame-ancestors 'self'""#;

pub const X_FRAME: &str = r#"# nginx
add_header X-Frame-Options "SAMEORIGIN" always;

# Apache
Header always set X-Frame-Options "SAMEORIGIN""#;

pub const SERVER_BANNER: &str = r#"# nginx
server_tokens off;

# Apache
ServerTokens Prod
ServerSignature Off"#;

pub const COOKIE_FLAGS: &str = "Set-Cookie: <name>=<value>; Path=/; Secure; HttpOnly; SameSite=Lax";

pub const HTTPS_REDIRECT: &str = r#"# nginx
server {
    listen 80;
    server_name example.com;
    return 301 https://$host$request_uri;
}"#;

pub const DENY_DOTFILES: &str = r#"# nginx
location ~ /\.(?!well-known) {
    deny all;
}

# Apache
<FilesMatch "^\.">
    Require all denied
</FilesMatch>"#;

pub const RESTRICT_PANEL: &str = r#"# nginx
location /admin {
    allow 10.0.0.0/8;
    deny all;
}"#;
