use actix_web::HttpRequest;
use qstring::QString;

pub(crate) trait HttpRequestExtensions {
    /// Gets a specific header from the current request.
    ///
    /// If the requested header does not exist in the current request or is not valid utf-8, returns `None`.
    /// This method does not allocate but instead returns a `&str`.
    fn get_header<S: AsRef<str>>(&self, header: S) -> Option<&str>;

    /// Gets a [QString](qstring::QString) built from the current request.
    ///
    /// This function is a shorthand for `QString::from(request.query_string())`. It is
    /// guaranteed to not fail or panic. If no query string was sent with the request,
    /// an empty QString struct is returned. This method will always allocate.
    fn q_string(&self) -> QString;
}

impl HttpRequestExtensions for HttpRequest {
    fn get_header<S: AsRef<str>>(&self, header: S) -> Option<&str> {
        self.headers().get(header.as_ref())?.to_str().ok()
    }

    fn q_string(&self) -> QString {
        QString::from(self.query_string())
    }
}
