//! Try-on viewer HTTP server
//!
//! Serves the browser page that owns the webcam and the WebGL rasterizer,
//! the variant meshes it loads, the pose frame stream it subscribes to,
//! and the model-selection API.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::output::sse;
use crate::AppState;

/// Viewer server state
pub struct ViewerServer {
    app_state: Arc<AppState>,
}

impl ViewerServer {
    /// Create a new viewer server
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self { app_state }
    }

    /// Create the router for viewer endpoints
    pub fn router(self) -> Router {
        let assets_dir = self.app_state.catalog.base_dir().to_path_buf();
        let shared_state = self.app_state;

        Router::new()
            .route("/", get(viewer_page))
            .route("/events", get(pose_stream))
            .route("/api/status", get(get_status))
            .route("/api/models", get(list_models))
            .route("/api/models/select", post(select_model))
            .nest_service("/assets", ServeDir::new(assets_dir))
            .with_state(shared_state)
    }
}

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn error(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
        })
    }

    pub fn ok() -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            error: None,
        })
    }
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub model: String,
    pub face_present: bool,
    pub variant: Option<crate::scene::Variant>,
}

/// Get current service status
async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let face_present = state.get_sample().await.is_some();
    let variant = state.scene.read().await.attached();
    let model = state.active_model().await;

    ApiResponse::success(StatusResponse {
        version: crate::VERSION.to_string(),
        model,
        face_present,
        variant,
    })
}

/// One catalog entry in the models listing
#[derive(Debug, Serialize)]
pub struct ModelEntry {
    pub name: String,
    pub stem: String,
    pub urls: Vec<String>,
    pub active: bool,
}

/// List catalog models
async fn list_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let active = state.active_model().await;

    let models: Vec<ModelEntry> = state
        .catalog
        .names()
        .into_iter()
        .filter_map(|name| state.catalog.get(name))
        .map(|model| ModelEntry {
            name: model.name().to_string(),
            stem: model.stem().to_string(),
            urls: crate::scene::Variant::ALL
                .iter()
                .map(|v| model.url_path(*v))
                .collect(),
            active: model.name() == active,
        })
        .collect();

    ApiResponse::success(models)
}

/// Model selection request
#[derive(Debug, Deserialize)]
pub struct SelectModel {
    pub model: String,
}

/// Switch the active glasses model
async fn select_model(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectModel>,
) -> impl IntoResponse {
    match state.set_active_model(&request.model).await {
        Ok(()) => {
            tracing::info!("Active model switched to {}", request.model);
            ApiResponse::ok()
        }
        Err(e) => ApiResponse::error(&e.to_string()),
    }
}

/// SSE endpoint for pose frames
async fn pose_stream(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    sse::create_frame_stream(state)
}

/// Render the try-on page.
///
/// The page is the external webcam + rasterizer capability: it opens the
/// camera (denial is logged to the browser console and the effect stays
/// off until reload), loads the active model's three variant meshes, and
/// mirrors the scene state streamed over SSE.
async fn viewer_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let config = state.config.read().await;
    let display = config.display.clone();
    let viewer = config.viewer.clone();
    let lens = config.glasses.lens.clone();
    drop(config);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Lunette Try-On</title>
    <style>
        body {{
            margin: 0;
            background: #111;
            display: flex;
            flex-direction: column;
            align-items: center;
            font-family: sans-serif;
            color: #eee;
        }}
        canvas {{ display: block; }}
        #controls {{ margin: 12px; }}
        video {{ display: none; }}
    </style>
    <script type="importmap">
    {{
        "imports": {{
            "three": "https://unpkg.com/three@0.160.0/build/three.module.js",
            "three/addons/": "https://unpkg.com/three@0.160.0/examples/jsm/"
        }}
    }}
    </script>
</head>
<body>
    <video id="video" autoplay muted playsinline width="{width}" height="{height}"></video>
    <canvas id="canvas" width="{width}" height="{height}"></canvas>
    <div id="controls"><select id="models"></select></div>

    <script type="module">
        import * as THREE from 'three';
        import {{ GLTFLoader }} from 'three/addons/loaders/GLTFLoader.js';

        const video = document.getElementById('video');
        const canvas = document.getElementById('canvas');

        const renderer = new THREE.WebGLRenderer({{ canvas, antialias: true, alpha: true }});
        renderer.setSize({width}, {height});

        const camera = new THREE.PerspectiveCamera({fov}, {width} / {height}, 0.01, 5000);
        camera.position.y = {camera_y};
        camera.position.z = {camera_z};

        const scene = new THREE.Scene();
        scene.add(new THREE.AmbientLight(0xffffff, 0.5));
        scene.add(new THREE.PointLight(0xffffff, 0.5));

        navigator.mediaDevices.getUserMedia({{ video: {{}} }}).then(stream => {{
            video.srcObject = stream;
            scene.background = new THREE.VideoTexture(video);
        }}).catch(err => console.error(err));

        const loader = new GLTFLoader();
        const meshes = {{}};
        let loadedStem = null;
        let attached = null;

        function tintLenses(mesh) {{
            mesh.traverse(child => {{
                if (child.name === 'lenses' && child.material) {{
                    child.material = new THREE.MeshLambertMaterial({{
                        color: new THREE.Color('{lens_color}'),
                        opacity: {lens_opacity},
                        transparent: true
                    }});
                }}
            }});
            return mesh;
        }}

        function loadModel(stem, urls) {{
            if (attached) {{ scene.remove(attached); attached = null; }}
            loadedStem = stem;
            for (const variant of ['front', 'left', 'right']) {{
                delete meshes[variant];
            }}
            urls.forEach((url, i) => {{
                const variant = ['front', 'left', 'right'][i];
                loader.load(url, gltf => {{ meshes[variant] = tintLenses(gltf.scene); }});
            }});
        }}

        async function refreshModels() {{
            const res = await fetch('/api/models');
            const body = await res.json();
            const select = document.getElementById('models');
            select.innerHTML = '';
            for (const model of body.data) {{
                const option = document.createElement('option');
                option.value = model.name;
                option.textContent = model.name;
                option.selected = model.active;
                select.appendChild(option);
                if (model.active) loadModel(model.stem, model.urls);
            }}
        }}

        document.getElementById('models').addEventListener('change', async e => {{
            await fetch('/api/models/select', {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify({{ model: e.target.value }})
            }});
            refreshModels();
        }});

        const events = new EventSource('/events');
        events.addEventListener('pose', event => {{
            const frame = JSON.parse(event.data);
            if (frame.model !== loadedStem) return; // meshes still loading or switching
            const mesh = meshes[frame.variant];
            if (!mesh) return;

            // Mirror the scene state: at most one variant attached
            if (attached !== mesh) {{
                if (attached) scene.remove(attached);
                scene.add(mesh);
                attached = mesh;
            }}
            mesh.rotation.set(frame.rotation[0], frame.rotation[1], frame.rotation[2]);
            mesh.position.set(frame.position[0], frame.position[1], frame.position[2]);
        }});
        events.onerror = err => console.error('SSE error:', err);

        function animate() {{
            requestAnimationFrame(animate);
            renderer.render(scene, camera);
        }}

        refreshModels();
        animate();
    </script>
</body>
</html>"#,
        width = display.width,
        height = display.height,
        fov = viewer.camera_fov,
        camera_y = viewer.camera_y,
        camera_z = viewer.camera_z,
        lens_color = lens.color,
        lens_opacity = lens.opacity,
    );

    Html(html)
}
