use actix_web::HttpRequest;

pub const DEFAULT_IMAGE_PATH: &str = "/default-image.png";

/// `scheme://host` the client used, unless a public base URL is configured
pub fn request_base_url(req: &HttpRequest, configured: Option<&str>) -> String {
    if let Some(base) = configured {
        return base.trim_end_matches('/').to_string();
    }
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

/// Turns a stored image reference into a URL the browser can load
pub fn resolve_image_url(base: &str, image: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    match image.map(str::trim).filter(|i| !i.is_empty()) {
        Some(image) if image.starts_with("http://") || image.starts_with("https://") => image.to_string(),
        Some(image) if image.starts_with('/') => format!("{}{}", base, image),
        Some(image) => format!("{}/{}", base, image),
        None => format!("{}{}", base, DEFAULT_IMAGE_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn relative_upload_paths_get_the_base() {
        assert_eq!(
            resolve_image_url("https://api.edu2medu.com", Some("/uploads/1712.png")),
            "https://api.edu2medu.com/uploads/1712.png"
        );
        assert_eq!(
            resolve_image_url("https://api.edu2medu.com/", Some("uploads/1712.png")),
            "https://api.edu2medu.com/uploads/1712.png"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let cdn = "https://res.cloudinary.com/edu2medu/image/upload/v1/school.webp";
        assert_eq!(resolve_image_url("http://localhost:8002", Some(cdn)), cdn);
    }

    #[test]
    fn missing_image_falls_back_to_default() {
        assert_eq!(
            resolve_image_url("http://localhost:8002", None),
            "http://localhost:8002/default-image.png"
        );
        assert_eq!(
            resolve_image_url("http://localhost:8002", Some("  ")),
            "http://localhost:8002/default-image.png"
        );
    }

    #[test]
    fn base_url_prefers_configuration() {
        let req = TestRequest::default()
            .insert_header(("host", "internal:8002"))
            .to_http_request();
        assert_eq!(
            request_base_url(&req, Some("https://api.edu2medu.com/")),
            "https://api.edu2medu.com"
        );
        assert_eq!(request_base_url(&req, None), "http://internal:8002");
    }
}
