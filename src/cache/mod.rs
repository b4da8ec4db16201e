pub mod object_cache;
pub mod register;
pub mod traits;

pub use traits::{CacheResult, ObjectCache};

/// 声明一个对象缓存插件，并在程序启动时自动注册到插件注册表
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $constructor:ty) => {
        ::paste::paste! {
            #[ctor::ctor]
            fn [<__register_object_cache_plugin_ $constructor:snake>]() {
                $crate::cache::register::register_object_cache_plugin(
                    $name,
                    ::std::sync::Arc::new(|| {
                        ::std::boxed::Box::pin(async {
                            <$constructor>::new()
                                .map(|cache| {
                                    ::std::boxed::Box::new(cache)
                                        as ::std::boxed::Box<dyn $crate::cache::ObjectCache>
                                })
                                .map_err($crate::errors::AssessmentError::cache_connection)
                        })
                    }),
                );
            }
        }
    };
}
