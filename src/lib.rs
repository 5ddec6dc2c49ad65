// ============================================================================
// StockDash - Library
// ============================================================================
// Expose les modules publics pour le binaire, le mode headless et les tests
// ============================================================================

pub mod api;       // Fournisseurs de données (Yahoo Finance)
pub mod models;    // Structures de données
pub mod dashboard; // Normalisation des entrées + construction des séries
pub mod app;       // État de l'application
pub mod ui;        // Interface utilisateur
