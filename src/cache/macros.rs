/// 通过 ctor 在进程启动时注册缓存后端
///
/// `$ty` 需要提供 `async fn from_config() -> Result<Self>`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            use std::sync::Arc;
            use $crate::cache::register::register_object_cache_plugin;

            register_object_cache_plugin(
                $name,
                Arc::new(|| {
                    Box::pin(async {
                        let cache = <$ty>::from_config().await?;
                        Ok(Box::new(cache) as Box<dyn $crate::cache::traits::ObjectCache>)
                    })
                }),
            );
        }
    };
}
